// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cooperative cancellation and fragment accounting

use crate::error::{CsgError, CsgResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared flag a caller sets to abandon a running combination
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-request work budget checked by the partition code
///
/// Counts every fragment created while building and clipping partitions.
#[derive(Debug, Default)]
pub struct WorkBudget {
    cancel: CancelToken,
    max_fragments: Option<usize>,
    fragments: AtomicUsize,
}

impl WorkBudget {
    pub fn new(cancel: CancelToken, max_fragments: Option<usize>) -> Self {
        Self {
            cancel,
            max_fragments,
            fragments: AtomicUsize::new(0),
        }
    }

    /// No limit and no way to cancel
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Fail fast if the request was cancelled
    pub fn check(&self) -> CsgResult<()> {
        if self.cancel.is_cancelled() {
            Err(CsgError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Account for `count` new fragments
    pub fn charge(&self, count: usize) -> CsgResult<()> {
        self.check()?;
        let total = self.fragments.fetch_add(count, Ordering::Relaxed) + count;
        match self.max_fragments {
            Some(limit) if total > limit => Err(CsgError::ResourceLimit { limit }),
            _ => Ok(()),
        }
    }

    pub fn fragments_created(&self) -> usize {
        self.fragments.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let budget = WorkBudget::new(token.clone(), None);
        assert!(budget.check().is_ok());
        token.cancel();
        assert!(matches!(budget.check(), Err(CsgError::Cancelled)));
    }

    #[test]
    fn test_fragment_limit() {
        let budget = WorkBudget::new(CancelToken::new(), Some(10));
        assert!(budget.charge(10).is_ok());
        assert!(matches!(
            budget.charge(1),
            Err(CsgError::ResourceLimit { limit: 10 })
        ));
        assert_eq!(budget.fragments_created(), 11);
    }
}
