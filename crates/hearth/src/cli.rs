use hearth_core::entity::{SessionReceiver, TextComponent};

/// Console stand-in for a game client: prints what a player's session received.
#[derive(Debug)]
pub struct ConsoleClient {
    name: String,
    receiver: SessionReceiver,
}

impl ConsoleClient {
    pub fn new(name: impl Into<String>, receiver: SessionReceiver) -> Self {
        Self {
            name: name.into(),
            receiver,
        }
    }

    /// Print every queued message as `[name] text`. Returns how many were printed.
    pub fn flush(&mut self) -> usize {
        let payloads = self.receiver.drain();
        for payload in &payloads {
            println!("[{}] {}", self.name, render(payload));
        }
        payloads.len()
    }
}

/// Plain text of a wire payload; undecodable payloads are shown raw
pub fn render(payload: &[u8]) -> String {
    match serde_json::from_slice::<TextComponent>(payload) {
        Ok(component) => component.to_plain_string(),
        Err(_) => String::from_utf8_lossy(payload).into_owned(),
    }
}
