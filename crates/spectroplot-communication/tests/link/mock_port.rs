use spectroplot_communication::{Link, SerialPort};
use spectroplot_core::{thread_safe, ThreadSafe};
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

#[derive(Default)]
struct MockState {
    reads: VecDeque<io::Result<Vec<u8>>>,
    writes: Vec<Vec<u8>>,
    close_count: usize,
    fail_writes: bool,
}

/// Serial port with scripted reads and recorded writes.
///
/// Clones share the same script, so a test keeps one handle while the link
/// owns another.
#[derive(Clone)]
pub struct MockPort {
    state: ThreadSafe<MockState>,
}

impl Default for MockPort {
    fn default() -> Self {
        Self {
            state: thread_safe(MockState::default()),
        }
    }
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link over a fresh mock, returning the test handle too
    pub fn link(capacity: usize) -> (Arc<Link>, MockPort) {
        let port = MockPort::new();
        let link = Arc::new(Link::new(Box::new(port.clone()), capacity));
        (link, port)
    }

    pub fn push_read(&self, data: &str) {
        self.push_read_bytes(data.as_bytes());
    }

    /// Queue raw bytes, which need not be valid UTF-8 on their own
    pub fn push_read_bytes(&self, data: &[u8]) {
        self.state.lock().reads.push_back(Ok(data.to_vec()));
    }

    pub fn push_read_error(&self, kind: io::ErrorKind) {
        self.state
            .lock()
            .reads
            .push_back(Err(io::Error::new(kind, "mock read failure")));
    }

    pub fn fail_writes(&self) {
        self.state.lock().fail_writes = true;
    }

    pub fn writes(&self) -> Vec<String> {
        self.state
            .lock()
            .writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Writes other than status queries
    pub fn commands(&self) -> Vec<String> {
        self.writes().into_iter().filter(|w| w != "?\n").collect()
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }
}

impl SerialPort for MockPort {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failure"));
        }
        state.writes.push(data.to_vec());
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        match state.reads.pop_front() {
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "no data")),
            Some(Err(e)) => Err(e),
            Some(Ok(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    state.reads.push_front(Ok(bytes[n..].to_vec()));
                }
                Ok(n)
            }
        }
    }

    fn name(&self) -> String {
        "mock".to_string()
    }

    fn close(&mut self) -> io::Result<()> {
        self.state.lock().close_count += 1;
        Ok(())
    }
}
