//! Credit balance bookkeeping.

use aegis_defence_core::CommandError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Economy {
    credits: u32,
}

impl Economy {
    pub(crate) const fn new(credits: u32) -> Self {
        Self { credits }
    }

    pub(crate) const fn credits(&self) -> u32 {
        self.credits
    }

    pub(crate) const fn can_afford(&self, cost: u32) -> bool {
        self.credits >= cost
    }

    /// Deducts `cost`, leaving the balance untouched when it is not covered.
    pub(crate) fn spend(&mut self, cost: u32) -> Result<(), CommandError> {
        if !self.can_afford(cost) {
            return Err(CommandError::InsufficientFunds {
                required: cost,
                available: self.credits,
            });
        }
        self.credits -= cost;
        Ok(())
    }

    pub(crate) fn credit(&mut self, amount: u32) {
        self.credits = self.credits.saturating_add(amount);
    }
}
