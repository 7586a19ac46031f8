//! Deterministic reshaping of generic remote records into domain records.
//!
//! The backing data source is a generic mock content API with no notion of
//! status, category, or roles, so each read pass decorates its records from
//! rotating tables. All choices are pure functions of `(seed, record id)`:
//! production draws a fresh seed per fetch, which is why callers must treat
//! remote status/category as eventually-overwritten presentation, never as
//! ground truth for locally tracked issues. Tests pin the seed and assert
//! exact output.

use chrono::{DateTime, Duration, Utc};

use crate::model::{Category, Role, Status};

#[derive(Debug, Clone, Copy)]
pub struct Enrichment {
    seed: u64,
}

const STATUSES: [Status; 3] = [Status::Pending, Status::InProgress, Status::Resolved];
const COMMENT_ROLES: [Role; 3] = [Role::Citizen, Role::Politician, Role::Moderator];

// Salts keep the per-field streams independent for the same record id.
const SALT_STATUS: u64 = 0x01;
const SALT_CATEGORY: u64 = 0x02;
const SALT_UPVOTES: u64 = 0x03;
const SALT_AGE: u64 = 0x04;
const SALT_ROLE: u64 = 0x05;
const SALT_ACTIVE: u64 = 0x06;
const SALT_LIKES: u64 = 0x07;

impl Enrichment {
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// A fresh seed for one read pass.
    #[must_use]
    pub fn random() -> Self {
        Self {
            seed: rand::random(),
        }
    }

    fn mix(self, record_id: u64, salt: u64) -> u64 {
        // splitmix64 finalizer over seed/id/salt.
        let mut z = self
            .seed
            .wrapping_add(record_id.wrapping_mul(0x9E37_79B9_7F4A_7C15))
            .wrapping_add(salt.wrapping_mul(0xBF58_476D_1CE4_E5B9));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    #[must_use]
    pub fn status(self, record_id: u64) -> Status {
        STATUSES[(self.mix(record_id, SALT_STATUS) % 3) as usize]
    }

    #[must_use]
    pub fn category(self, record_id: u64) -> Category {
        Category::ALL[(self.mix(record_id, SALT_CATEGORY) % Category::ALL.len() as u64) as usize]
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn upvotes(self, record_id: u64) -> u32 {
        (self.mix(record_id, SALT_UPVOTES) % 100) as u32
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn likes(self, record_id: u64) -> u32 {
        (self.mix(record_id, SALT_LIKES) % 200) as u32
    }

    /// The assumed role of a comment author (the mock store has none).
    #[must_use]
    pub fn comment_role(self, record_id: u64) -> Role {
        COMMENT_ROLES[(self.mix(record_id, SALT_ROLE) % 3) as usize]
    }

    /// The assumed role of a user account.
    #[must_use]
    pub fn account_role(self, record_id: u64) -> Role {
        Role::ALL[(self.mix(record_id, SALT_ROLE) % Role::ALL.len() as u64) as usize]
    }

    /// Roughly four out of five accounts present as active.
    #[must_use]
    pub fn account_active(self, record_id: u64) -> bool {
        self.mix(record_id, SALT_ACTIVE) % 5 != 0
    }

    /// A creation stamp somewhere in the `max_age` window before `now`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn created_within(
        self,
        record_id: u64,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let window_ms = max_age.num_milliseconds().max(1);
        let offset_ms = (self.mix(record_id, SALT_AGE) % window_ms.unsigned_abs()) as i64;
        now - Duration::milliseconds(offset_ms)
    }
}
