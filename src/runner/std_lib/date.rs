//! Date members.

use chrono::{Datelike, Duration, NaiveDate};

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::Value;
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::types::ValueResult;

use super::{number_arg, MemberTable};

pub fn members() -> MemberTable {
    MemberTable::new("date")
        .add_property("year", date_year)
        .add_property("month", date_month)
        .add_property("day", date_day)
        .add_property("weekday", date_weekday)
        .add_method("addDays", date_add_days)
}

fn date(receiver: &Value) -> Result<NaiveDate, ScriptError> {
    match receiver {
        Value::Date(d) => Ok(*d),
        other => Err(ScriptError::type_error(format!(
            "expected a date, got {}",
            other.type_name()
        ))),
    }
}

fn date_year(receiver: &Value) -> ValueResult {
    Ok(Value::Number(date(receiver)?.year() as f64))
}

fn date_month(receiver: &Value) -> ValueResult {
    Ok(Value::Number(date(receiver)?.month() as f64))
}

fn date_day(receiver: &Value) -> ValueResult {
    Ok(Value::Number(date(receiver)?.day() as f64))
}

/// ISO weekday: Monday is 1, Sunday is 7.
fn date_weekday(receiver: &Value) -> ValueResult {
    Ok(Value::Number(
        date(receiver)?.weekday().number_from_monday() as f64,
    ))
}

fn date_add_days(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let days = number_arg(&args, 0, "addDays")?;
    if days.fract() != 0.0 || days.abs() > 3_650_000.0 {
        return Err(ScriptError::range_error(format!("cannot add {} days", days)));
    }
    date(receiver)?
        .checked_add_signed(Duration::days(days as i64))
        .map(Value::Date)
        .ok_or_else(|| ScriptError::range_error("date out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_and_add_days() {
        let mut ctx = EvalContext::new();
        let d = Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(date_weekday(&d).unwrap(), Value::Number(3.0));
        let next = date_add_days(&mut ctx, &d, vec![Value::Number(1.0)]).unwrap();
        assert_eq!(date_month(&next).unwrap(), Value::Number(2.0));
    }
}
