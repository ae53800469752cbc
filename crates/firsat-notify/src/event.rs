// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deal lifecycle event classification.
//!
//! A pure function of the change's before/after snapshots; no transport is
//! needed to decide what a change means, which keeps the decision table
//! testable in isolation.

use firsat_core::types::DealChange;

/// What a deal change calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanoutDecision {
    /// Freshly created and unapproved: notify the admin review queue only.
    AdminReview,
    /// Approved (at creation or by a false-to-true flip): full fan-out.
    FullFanout,
    /// Any other update: nothing to do.
    Ignore,
}

/// Classifies a change per the decision table:
///
/// | Condition | Decision |
/// |---|---|
/// | Created, approved | `FullFanout` |
/// | Created, unapproved | `AdminReview` |
/// | Updated, approval flipped false→true | `FullFanout` |
/// | Updated, anything else | `Ignore` |
pub fn classify(change: &DealChange) -> FanoutDecision {
    match &change.before {
        None => {
            if change.after.is_approved {
                FanoutDecision::FullFanout
            } else {
                FanoutDecision::AdminReview
            }
        }
        Some(before) => {
            if !before.is_approved && change.after.is_approved {
                FanoutDecision::FullFanout
            } else {
                FanoutDecision::Ignore
            }
        }
    }
}
