/// Leave days deducted at the plain daily rate before the penalty kicks in.
pub const FREE_LEAVE_DAYS: u32 = 5;
/// Multiplier applied to every leave day past the free allowance.
pub const DOUBLE_DEDUCTION_MULTIPLIER: f64 = 2.0;
/// Salary months are fixed at 30 days.
pub const MONTH_DAYS: u32 = 30;

pub fn per_day_salary(monthly_salary: f64) -> f64 {
    monthly_salary / MONTH_DAYS as f64
}

/// Tiered leave deduction: the first `FREE_LEAVE_DAYS` cost one daily rate
/// each, every day beyond that costs double.
pub fn leave_deduction(leave_days: u32, per_day_salary: f64) -> f64 {
    if leave_days <= FREE_LEAVE_DAYS {
        leave_days as f64 * per_day_salary
    } else {
        FREE_LEAVE_DAYS as f64 * per_day_salary
            + (leave_days - FREE_LEAVE_DAYS) as f64 * per_day_salary * DOUBLE_DEDUCTION_MULTIPLIER
    }
}

/// Final payable salary. Not floored at zero: heavy leave can drive it
/// negative, which callers surface as-is.
pub fn final_salary(monthly_salary: f64, deduction: f64) -> f64 {
    monthly_salary - deduction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_free_allowance() {
        assert_eq!(leave_deduction(3, 100.0), 300.0);
    }

    #[test]
    fn at_free_allowance_boundary() {
        assert_eq!(leave_deduction(5, 100.0), 500.0);
    }

    #[test]
    fn beyond_allowance_doubles() {
        // 5*100 + 2*100*2
        assert_eq!(leave_deduction(7, 100.0), 900.0);
    }

    #[test]
    fn zero_leave_zero_deduction() {
        assert_eq!(leave_deduction(0, 100.0), 0.0);
    }

    #[test]
    fn per_day_uses_fixed_thirty() {
        assert_eq!(per_day_salary(3000.0), 100.0);
    }

    #[test]
    fn final_salary_can_go_negative() {
        let deduction = leave_deduction(29, 100.0);
        assert_eq!(deduction, 500.0 + 24.0 * 200.0);
        assert_eq!(final_salary(3000.0, deduction), -2300.0);
    }
}
