use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanFundError;
use crate::types::{Money, Rate};
use crate::LoanFundResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const MIN_RATE: Decimal = dec!(-0.95);
const MAX_RATE: Decimal = dec!(10);

/// Net Present Value of a series of periodic cash flows (index 0 undiscounted).
pub fn npv(rate: Rate, cash_flows: &[Money]) -> LoanFundResult<Money> {
    if rate <= dec!(-1) {
        return Err(LoanFundError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    let (value, _) = npv_and_derivative(rate, cash_flows).ok_or_else(|| {
        LoanFundError::InsufficientData("NPV overflowed decimal range".into())
    })?;
    Ok(value)
}

/// NPV and its first derivative with respect to the rate, or `None` on overflow.
fn npv_and_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Money, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    let mut value = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        let t_i = t as i64;
        let discount = one_plus_r.checked_powi(t_i)?;
        if discount.is_zero() {
            return None;
        }
        value = value.checked_add(cf.checked_div(discount)?)?;
        if t > 0 {
            let next = discount.checked_mul(one_plus_r)?;
            let term = Decimal::from(t_i).checked_mul(*cf)?.checked_div(next)?;
            derivative = derivative.checked_sub(term)?;
        }
    }

    Some((value, derivative))
}

/// Periodic Internal Rate of Return using Newton-Raphson.
///
/// Requires at least one negative and one positive flow.
pub fn irr(cash_flows: &[Money], guess: Rate) -> LoanFundResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(LoanFundError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    let has_outflow = cash_flows.iter().any(|cf| cf.is_sign_negative() && !cf.is_zero());
    let has_inflow = cash_flows.iter().any(|cf| cf.is_sign_positive() && !cf.is_zero());
    if !(has_outflow && has_inflow) {
        return Err(LoanFundError::InsufficientData(
            "IRR requires both an outflow and an inflow".into(),
        ));
    }

    let mut rate = guess;
    let mut last_delta = Decimal::ZERO;

    for i in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) =
            npv_and_derivative(rate, cash_flows).ok_or_else(|| LoanFundError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta,
            })?;
        last_delta = npv_val;

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(LoanFundError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        let step = npv_val.checked_div(dnpv).ok_or_else(|| LoanFundError::ConvergenceFailure {
            function: "IRR".into(),
            iterations: i,
            last_delta: npv_val,
        })?;
        rate = (rate - step).clamp(MIN_RATE, MAX_RATE);
    }

    Err(LoanFundError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta,
    })
}
