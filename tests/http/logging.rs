//! Server-side logging of internal errors.

use std::io;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::support::{read, stalled_contacts, start_server};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    /// Every captured line whose message is `server error`.
    fn server_errors(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .filter(|event| event["fields"]["message"] == "server error")
            .collect()
    }
}

// Current-thread runtime: the server tasks run on this thread, so the
// scoped subscriber sees their events.
#[tokio::test]
async fn internal_errors_are_logged_with_the_request() {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = start_server(stalled_contacts()).await;

    let resp = app.client.get(app.url("/contact?id=7")).send().await.unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, 500);
    assert!(!body.to_string().contains("deadline"));

    let events = sink.server_errors();
    assert_eq!(events.len(), 1, "{events:?}");
    let fields = &events[0]["fields"];
    assert_eq!(events[0]["level"], "ERROR");
    assert_eq!(fields["request_method"], "GET");
    assert_eq!(fields["request_url"], "/contact?id=7");
    assert_eq!(fields["error"], "deadline exceeded");

    // Client errors are not logged as server errors.
    let resp = app.client.get(app.url("/group?id=9")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(sink.server_errors().len(), 1);
}
