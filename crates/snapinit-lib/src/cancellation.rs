//! Cooperative cancellation of a resolution run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Shared flag checked between blocking steps, optionally tripping itself at a deadline.
///
/// Clones share the same flag so one can be handed to another thread to cancel the run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
	cancelled: Arc<AtomicBool>,
	deadline: Option<Instant>,
}

impl CancellationToken {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn with_deadline(deadline: Instant) -> Self {
		Self { deadline: Some(deadline), ..Default::default() }
	}

	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst) || self.deadline.map_or(false, |d| Instant::now() >= d)
	}

	/// # Errors
	/// [`Cancelled`](crate::Error::Cancelled) once cancelled or past the deadline.
	pub fn check(&self) -> crate::Result<()> {
		if self.is_cancelled() {
			Err(crate::Error::Cancelled)
		} else {
			Ok(())
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use std::time::Duration;

	#[test]
	fn clones_share_the_flag() {
		let token = CancellationToken::new();
		let other = token.clone();
		assert!(token.check().is_ok());
		other.cancel();
		assert!(matches!(token.check(), Err(crate::Error::Cancelled)));
	}

	#[test]
	fn passed_deadline_cancels() {
		let token = CancellationToken::with_deadline(Instant::now() - Duration::from_millis(1));
		assert!(token.is_cancelled());
		assert!(!CancellationToken::with_deadline(Instant::now() + Duration::from_secs(60)).is_cancelled());
	}
}
