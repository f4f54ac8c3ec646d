//! Ticket store and the ticket update use case.
//!
//! Every state change goes through [`TicketStateFlowValidator`]; a rejected
//! change leaves the ticket untouched, an accepted one updates the state and
//! appends a history entry in the same write.

mod ticket;

pub use ticket::{HistoryEntry, Rating, Ticket};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::workflow::{TicketState, TicketStateFlowValidator, TransitionRejection};

/// Lowest and highest accepted rating score
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("ticket #{0} not found")]
    NotFound(u64),

    #[error(transparent)]
    Rejected(#[from] TransitionRejection),

    #[error("ticket title is required")]
    EmptyTitle,

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("only resolved or closed tickets can be rated (ticket is {0})")]
    NotRateable(TicketState),

    #[error("ticket #{0} has already been rated")]
    AlreadyRated(u64),

    #[error("failed to access ticket store: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse ticket store: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// On-disk layout of the store file
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    next_id: u64,
    tickets: Vec<Ticket>,
}

/// Tickets keyed by id, optionally backed by a JSON file
#[derive(Debug)]
pub struct TicketStore {
    path: Option<PathBuf>,
    tickets: BTreeMap<u64, Ticket>,
    next_id: u64,
    validator: TicketStateFlowValidator,
}

impl TicketStore {
    /// Load the store from `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TicketError> {
        let path = path.into();

        let file = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str::<StoreFile>(&contents)?
        } else {
            StoreFile::default()
        };

        let tickets: BTreeMap<u64, Ticket> = file.tickets.into_iter().map(|t| (t.id, t)).collect();
        // Never reuse an id, even if next_id was edited by hand
        let next_id = tickets
            .keys()
            .next_back()
            .map_or(1, |max| max + 1)
            .max(file.next_id);

        tracing::debug!(
            path = %path.display(),
            count = tickets.len(),
            "Loaded ticket store"
        );

        Ok(Self {
            path: Some(path),
            tickets,
            next_id,
            validator: TicketStateFlowValidator::new(),
        })
    }

    /// A store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tickets: BTreeMap::new(),
            next_id: 1,
            validator: TicketStateFlowValidator::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the store to disk (temp file, then rename)
    pub fn save(&self) -> Result<(), TicketError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = StoreFile {
            next_id: self.next_id,
            tickets: self.tickets.values().cloned().collect(),
        };
        let contents = serde_json::to_string_pretty(&file)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn get(&self, id: u64) -> Result<&Ticket, TicketError> {
        self.tickets.get(&id).ok_or(TicketError::NotFound(id))
    }

    /// All tickets, oldest first
    pub fn list(&self) -> Vec<&Ticket> {
        self.tickets.values().collect()
    }

    pub fn list_by_state(&self, state: TicketState) -> Vec<&Ticket> {
        self.tickets.values().filter(|t| t.state == state).collect()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Open a new ticket in `Pendiente`
    pub fn create(
        &mut self,
        title: &str,
        description: &str,
        client: &str,
    ) -> Result<Ticket, TicketError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TicketError::EmptyTitle);
        }

        let ticket = Ticket::open(
            self.next_id,
            title.to_string(),
            description.to_string(),
            client.to_string(),
        );

        self.next_id += 1;
        if let Err(e) = self.commit(ticket.clone()) {
            self.next_id -= 1;
            return Err(e);
        }

        tracing::info!(
            ticket_id = ticket.id,
            client = %ticket.client,
            "Ticket created"
        );
        Ok(ticket)
    }

    /// Record the technician responsible for a ticket; the state is unchanged
    pub fn assign_technician(
        &mut self,
        id: u64,
        technician_id: i64,
        actor: &str,
    ) -> Result<Ticket, TicketError> {
        let mut ticket = self.get(id)?.clone();
        if ticket.state.is_terminal() {
            return Err(TransitionRejection::TicketClosed.into());
        }

        ticket.technician_id = Some(technician_id);
        ticket.updated_at = chrono::Utc::now();
        let ticket = self.commit(ticket)?;

        tracing::info!(ticket_id = id, technician_id, actor, "Technician assigned");
        Ok(ticket)
    }

    /// Validate and apply a state change, recording it in the ticket history.
    ///
    /// On rejection the ticket is left exactly as it was.
    pub fn change_state(
        &mut self,
        id: u64,
        requested: TicketState,
        comment: &str,
        actor: &str,
    ) -> Result<Ticket, TicketError> {
        let mut ticket = self.get(id)?.clone();
        let previous = ticket.state;

        let outcome = self
            .validator
            .check(previous, requested, ticket.technician_id, comment);
        if let Err(rejection) = outcome {
            tracing::debug!(
                ticket_id = id,
                from = %previous,
                to = %requested,
                reason = %rejection,
                "Transition rejected"
            );
            return Err(rejection.into());
        }

        ticket.apply_transition(requested, comment, actor);
        let ticket = self.commit(ticket)?;

        tracing::info!(
            ticket_id = id,
            from = %previous,
            to = %requested,
            actor,
            "Ticket state changed"
        );
        Ok(ticket)
    }

    /// Move a ticket one step forward on the happy path
    pub fn advance(&mut self, id: u64, comment: &str, actor: &str) -> Result<Ticket, TicketError> {
        let current = self.get(id)?.state;
        let next = self.validator.next_state(current);
        self.change_state(id, next, comment, actor)
    }

    /// Attach the client's rating to a resolved or closed ticket
    pub fn rate(
        &mut self,
        id: u64,
        score: u8,
        comment: Option<&str>,
    ) -> Result<Ticket, TicketError> {
        if !RATING_RANGE.contains(&score) {
            return Err(TicketError::InvalidRating(score));
        }

        let mut ticket = self.get(id)?.clone();
        if !ticket.is_rateable() {
            return Err(TicketError::NotRateable(ticket.state));
        }
        if ticket.rating.is_some() {
            return Err(TicketError::AlreadyRated(id));
        }

        ticket.rating = Some(Rating {
            score,
            comment: comment
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            rated_at: chrono::Utc::now(),
        });
        let ticket = self.commit(ticket)?;

        tracing::info!(ticket_id = id, score, "Ticket rated");
        Ok(ticket)
    }

    /// Replace the stored ticket and persist; restores the old copy if the write fails
    fn commit(&mut self, ticket: Ticket) -> Result<Ticket, TicketError> {
        let id = ticket.id;
        let previous = self.tickets.insert(id, ticket.clone());

        if let Err(e) = self.save() {
            match previous {
                Some(old) => {
                    self.tickets.insert(id, old);
                }
                None => {
                    self.tickets.remove(&id);
                }
            }
            return Err(e);
        }

        Ok(ticket)
    }
}
