// Demo mode: canned replies so the rain can be shown without an API key
//
// When demo_mode is set, submissions are answered locally from a fixed
// rotation after a short artificial delay instead of hitting the API.
//
// Run with: TRINITY_DEMO=1 cargo run --release

use std::time::Duration;

/// Artificial "network" latency before a canned reply arrives
pub const RESPONSE_DELAY: Duration = Duration::from_millis(900);

const REPLIES: &[&str] = &[
    "I know why you're here. You're looking for an answer, and the answer is \
out there. It's looking for you.",
    "The Matrix is a system. That system is our enemy. When you're inside, \
what do you see? The minds of the very people we are trying to save.",
    "There's a difference between knowing the path and walking the path.",
    "Demo mode is on, so that reply came from me, not the network. Export \
OPENAI_API_KEY and restart to talk to a real model.",
    "Neo, no one has ever done anything like this. That's why it's going \
to work.",
];

/// Reply for the nth submission of the session, cycling through the pool
pub fn reply(turn: usize) -> &'static str {
    REPLIES[turn % REPLIES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_cycle_through_the_pool() {
        assert_eq!(reply(0), REPLIES[0]);
        assert_eq!(reply(REPLIES.len()), REPLIES[0]);
        assert_eq!(reply(REPLIES.len() + 2), REPLIES[2]);
    }

    #[test]
    fn every_reply_is_nonempty() {
        for i in 0..REPLIES.len() {
            assert!(!reply(i).is_empty());
        }
    }
}
