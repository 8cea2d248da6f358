//! # Drive Segmenter
//!
//! Groups classified plays into drives.
//!
//! ## Algorithm
//! 1. Scan plays in input order
//! 2. Open a new drive when the offense changes or the previous play ended
//!    the possession (any terminal play)
//! 3. Close every drive with the turnover-on-downs correction: a regular
//!    4th-down last play becomes a turnover
//!
//! Only the last play of a drive is ever corrected. This relies on step 2
//! isolating single possessions; an interior 4th-down failure would go
//! unnoticed if it did not.

use crate::play::{CanonicalPlay, Outcome};

/// A maximal run of plays by one offense.
///
/// Every play but the last is regular; the last may be of any type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drive {
    offense: String,
    plays: Vec<CanonicalPlay>,
}

impl Drive {
    pub fn offense(&self) -> &str {
        &self.offense
    }

    pub fn plays(&self) -> &[CanonicalPlay] {
        &self.plays
    }

    pub fn first(&self) -> &CanonicalPlay {
        &self.plays[0]
    }

    pub fn last(&self) -> &CanonicalPlay {
        &self.plays[self.plays.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    /// Always false for drives built by [`segment`].
    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    /// Outcome of the final play, `None` when the drive ends on a regular play
    /// (end of half, end of input).
    pub fn outcome(&self) -> Option<Outcome> {
        self.last().outcome()
    }
}

/// Internal accumulator for the drive being scanned.
struct DriveBuilder {
    offense: String,
    plays: Vec<CanonicalPlay>,
}

impl DriveBuilder {
    fn new(play: CanonicalPlay) -> Self {
        Self {
            offense: play.offense.clone(),
            plays: vec![play],
        }
    }

    fn accepts(&self, play: &CanonicalPlay) -> bool {
        let open = self.plays.last().is_some_and(CanonicalPlay::is_regular);
        open && self.offense == play.offense
    }

    fn add(&mut self, play: CanonicalPlay) {
        self.plays.push(play);
    }

    fn build(self) -> Drive {
        correct_turnover_on_downs(Drive {
            offense: self.offense,
            plays: self.plays,
        })
    }
}

/// Split plays into drives, applying the turnover-on-downs correction.
pub fn segment<I>(plays: I) -> Vec<Drive>
where
    I: IntoIterator<Item = CanonicalPlay>,
{
    let mut drives = Vec::new();
    let mut current: Option<DriveBuilder> = None;

    for play in plays {
        match current.as_mut() {
            Some(builder) if builder.accepts(&play) => builder.add(play),
            _ => {
                if let Some(done) = current.replace(DriveBuilder::new(play)) {
                    drives.push(done.build());
                }
            }
        }
    }
    if let Some(done) = current {
        drives.push(done.build());
    }

    drives
}

/// Replace a regular 4th-down last play with a turnover.
///
/// A failed 4th down hands the ball over, but the classifier only sees the
/// play itself; the drive boundary is what reveals it.
pub fn correct_turnover_on_downs(mut drive: Drive) -> Drive {
    let last = drive.last();
    if last.is_regular() && last.down() == Some(4) {
        let offense = last.offense.clone();
        if let Some(slot) = drive.plays.last_mut() {
            *slot = CanonicalPlay::terminal(offense, Outcome::Turnover);
        }
    }
    drive
}
