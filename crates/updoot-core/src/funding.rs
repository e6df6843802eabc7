use crate::types::{Currency, PcBase};
use crate::validation::Language;

/// Balance check shown before a vote or donation is submitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentQuote {
    pub currency: Currency,
    pub balance: f64,
    pub cost: f64,
}

impl PaymentQuote {
    /// A Stardust vote costs the item's price per vote.
    pub fn vote(item: &PcBase, balance: f64) -> Self {
        Self {
            currency: Currency::Stardust,
            balance,
            cost: item.cost_per_vote,
        }
    }

    pub fn donation(amount: f64, balance: f64) -> Self {
        Self {
            currency: Currency::WeMake,
            balance,
            cost: amount,
        }
    }

    pub fn remaining(&self) -> f64 {
        self.balance - self.cost
    }

    pub fn is_insufficient(&self) -> bool {
        self.balance < self.cost
    }

    /// Donations must also be for a positive amount.
    pub fn can_submit(&self) -> bool {
        match self.currency {
            Currency::Stardust => !self.is_insufficient(),
            Currency::WeMake => self.cost > 0.0 && !self.is_insufficient(),
        }
    }

    pub fn lines(&self, lang: Language) -> [(String, String); 3] {
        let symbol = self.currency.symbol();
        let currency = match self.currency {
            Currency::Stardust => "Stardust",
            Currency::WeMake => "WeMake",
        };
        let (balance, amount, after) = match (lang, self.currency) {
            (Language::En, Currency::Stardust) => (
                format!("{} Balance", currency),
                "Payment amount".to_string(),
                "Balance after payment".to_string(),
            ),
            (Language::En, Currency::WeMake) => (
                format!("{} Balance", currency),
                "Donation amount".to_string(),
                "Balance after donation".to_string(),
            ),
            (Language::Ko, _) => (format!("{} 균형", currency), "비용".to_string(), "나머지".to_string()),
        };
        [
            (balance, format!("{} ${}", self.balance, symbol)),
            (amount, format!("{} ${}", self.cost, symbol)),
            (after, format!("{} ${}", self.remaining(), symbol)),
        ]
    }
}

/// Share of the target collected so far, in percent. A zero target counts as one.
pub fn progress_percent(current: f64, target: f64) -> f64 {
    let target = if target == 0.0 { 1.0 } else { target };
    current / target * 100.0
}

pub fn progress_label(current: f64, target: f64) -> String {
    format!("{:.2}%", progress_percent(current, target))
}
