// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

pub mod approvals;
pub mod clock;
pub mod context;
pub mod executor;
pub mod oracle;
pub mod recovery;
pub mod rng;
pub mod scheduler;
