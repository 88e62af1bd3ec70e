use tracing::{debug, warn};

use crate::api::RentalApi;
use crate::state::StateHandle;

/// Ticket for one unread-count fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountTicket(u64);

/// Badge figure: the server's count of unread messages addressed to the user.
/// Never adjusted locally, only replaced by a fresh server value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnreadCounter {
    count: u32,
    generation: u64,
}

impl UnreadCounter {
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Badge text, capped at "9+". Nothing is shown at zero.
    pub fn badge(&self) -> Option<String> {
        match self.count {
            0 => None,
            n if n > 9 => Some("9+".to_string()),
            n => Some(n.to_string()),
        }
    }

    pub fn begin_refresh(&mut self) -> CountTicket {
        self.generation += 1;
        CountTicket(self.generation)
    }

    /// An older request finishing late must not overwrite a newer figure.
    pub fn apply(&mut self, ticket: CountTicket, count: u32) -> bool {
        if ticket.0 != self.generation {
            debug!("Dropping superseded unread count {count}");
            return false;
        }
        self.count = count;
        true
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.generation += 1;
    }
}

/// Replaces the badge figure with the server's. Failures leave it unchanged.
pub async fn refresh_unread<A, H>(api: &A, token: &str, counter: &H)
where
    A: RentalApi,
    H: StateHandle<UnreadCounter>,
{
    let Some(ticket) = counter.write(|c| c.begin_refresh()) else {
        return;
    };
    match api.unread_count(token).await {
        Ok(count) => {
            counter.write(|c| c.apply(ticket, count));
        }
        Err(e) => warn!("Failed to fetch unread count: {e}"),
    }
}
