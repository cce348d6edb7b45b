use crate::foundation::error::{ReelError, ReelResult};

/// Upper bound on the number of yearly periods; the explainer lays out one row per year.
pub const MAX_YEARS: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Inputs of one run: initial amount, annual rate as a decimal, number of yearly periods.
pub struct Scenario {
    pub principal: f64,
    pub rate: f64,
    pub years: u32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            principal: 1000.0,
            rate: 0.10,
            years: 5,
        }
    }
}

impl Scenario {
    pub fn new(principal: f64, rate: f64, years: u32) -> ReelResult<Self> {
        let s = Self {
            principal,
            rate,
            years,
        };
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(ReelError::validation(
                "principal must be finite and > 0",
            ));
        }
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(ReelError::validation("rate must be finite and >= 0"));
        }
        if self.years > MAX_YEARS {
            return Err(ReelError::validation(format!(
                "years must be <= {MAX_YEARS}"
            )));
        }
        let final_amount = self.principal * growth_factor(self);
        if !final_amount.is_finite() {
            return Err(ReelError::validation(format!(
                "scenario P={:?} i={:?} n={} compounds past the largest representable amount",
                self.principal, self.rate, self.years
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AmountPoint {
    pub period: u32,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Account value at each of the `years + 1` time points, ordered by period.
pub struct AmountSequence {
    points: Vec<AmountPoint>,
}

impl AmountSequence {
    fn from_fn(years: u32, f: impl Fn(u32) -> f64) -> Self {
        Self {
            points: (0..=years)
                .map(|t| AmountPoint {
                    period: t,
                    amount: f(t),
                })
                .collect(),
        }
    }

    pub fn points(&self) -> &[AmountPoint] {
        &self.points
    }

    pub fn amounts(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.amount).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.points.first().map(|p| p.amount).unwrap_or(0.0)
    }

    pub fn last(&self) -> f64 {
        self.points.last().map(|p| p.amount).unwrap_or(0.0)
    }

    pub fn is_monotonic_non_decreasing(&self) -> bool {
        self.points.windows(2).all(|w| w[0].amount <= w[1].amount)
    }

    pub fn second_differences(&self) -> Vec<f64> {
        self.points
            .windows(3)
            .map(|w| (w[2].amount - w[1].amount) - (w[1].amount - w[0].amount))
            .collect()
    }
}

/// `P * (1 + i*t)` for `t` in `[0, years]`.
pub fn simple_amounts(s: &Scenario) -> AmountSequence {
    AmountSequence::from_fn(s.years, |t| s.principal * (1.0 + s.rate * f64::from(t)))
}

/// `P * (1 + i)^t` for `t` in `[0, years]`.
pub fn compound_amounts(s: &Scenario) -> AmountSequence {
    AmountSequence::from_fn(s.years, |t| s.principal * (1.0 + s.rate).powi(t as i32))
}

/// `(1 + i)^n`
pub fn growth_factor(s: &Scenario) -> f64 {
    (1.0 + s.rate).powi(s.years as i32)
}

/// Interest earned over the whole run: `P [(1 + i)^n - 1]`.
pub fn compound_interest(s: &Scenario) -> f64 {
    s.principal * (growth_factor(s) - 1.0)
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AmountComparison {
    pub simple_final: f64,
    pub compound_final: f64,
    /// `compound[n] - simple[n]`; display only.
    pub difference: f64,
}

pub fn compare(s: &Scenario) -> AmountComparison {
    let simple_final = simple_amounts(s).last();
    let compound_final = compound_amounts(s).last();
    AmountComparison {
        simple_final,
        compound_final,
        difference: compound_final - simple_final,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// One row of the year-by-year compounding breakdown.
pub struct YearStep {
    pub year: u32,
    pub opening: f64,
    pub closing: f64,
    pub interest_earned: f64,
}

pub fn year_breakdown(s: &Scenario) -> Vec<YearStep> {
    let amounts = compound_amounts(s).amounts();
    amounts
        .iter()
        .enumerate()
        .map(|(year, &closing)| {
            let opening = if year == 0 { closing } else { amounts[year - 1] };
            YearStep {
                year: year as u32,
                opening,
                closing,
                interest_earned: closing - opening,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/finance/amounts.rs"]
mod tests;
