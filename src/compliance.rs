use crate::levels::Level;
use crate::uncertainty::Expanded;
use statrs::distribution::{ContinuousCDF, Normal};

/// Terminal compliance classification of one measurement against its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pass,
    ConditionalPass,
    ConditionalFail,
    Fail,
    Undefined,
}

impl Decision {
    pub fn label(self) -> &'static str {
        match self {
            Decision::Pass => "pass",
            Decision::ConditionalPass => "conditional pass",
            Decision::ConditionalFail => "conditional fail",
            Decision::Fail => "fail",
            Decision::Undefined => "—",
        }
    }
}

/// Compliance columns attached to a summary or daily row.
#[derive(Debug, Clone)]
pub struct ComplianceFields {
    pub limit: Level,
    pub k: Level,
    pub u: Level,
    /// Exceedance over the limit, floored at zero.
    pub excess: Level,
    /// Allowed measurement margin, `w = −U`. The margin is negative whenever
    /// the expanded uncertainty is positive; the decision band shrinks as
    /// uncertainty grows. Fixed sign contract, do not "fix".
    pub margin: Level,
    /// Adjusted upper threshold `Au = Tu − w`.
    pub upper: Level,
    pub z: Level,
    /// Probability of compliance under the Gaussian measurement model.
    pub p_compliance: Level,
    /// Complement: probability of exceeding the limit.
    pub p_exceedance: Level,
    pub decision: Decision,
}

/// Pure classification of (level, limit, margin).
pub fn decide(level: Level, limit: Level, margin: Level) -> Decision {
    let (Some(l), Some(tu), Some(w)) = (level.value(), limit.value(), margin.value()) else {
        return Decision::Undefined;
    };
    let au = tu - w;

    if w == 0.0 {
        Decision::Undefined
    } else if w > 0.0 {
        if l <= au {
            Decision::Pass
        } else if l <= tu {
            Decision::ConditionalPass
        } else if l <= tu + w {
            Decision::ConditionalFail
        } else {
            Decision::Fail
        }
    } else if l <= tu {
        Decision::Pass
    } else if l <= au {
        Decision::ConditionalPass
    } else {
        Decision::Fail
    }
}

/// Evaluates every compliance column for one row.
///
/// The measured level is modeled as Gaussian with mean `level` and standard
/// deviation `U/K`; the compliance probability is the CDF at the z-shifted
/// point `level + (U/K)·Z` with `Z = (Tu − level)/(U/K)`. A zero or
/// undefined `U` or `K` leaves the probabilistic columns undefined.
pub fn evaluate(level: Level, limit: Level, expanded: &Expanded) -> ComplianceFields {
    let excess = level.zip(limit, |l, tu| (l - tu).max(0.0));
    let margin = expanded.u.map(|u| -u);
    let upper = limit.zip(margin, |tu, w| tu - w);

    let sigma = expanded.u.zip(expanded.k, |u, k| u / k);
    let z = limit.zip(level, |tu, l| tu - l).zip(sigma, |num, s| num / s);

    let p_compliance = match (level.value(), sigma.value(), z.value()) {
        (Some(l), Some(s), Some(zv)) if s > 0.0 => match Normal::new(l, s) {
            Ok(dist) => Level::new(dist.cdf(l + s * zv)),
            Err(_) => Level::Undefined,
        },
        _ => Level::Undefined,
    };
    let p_exceedance = p_compliance.map(|p| 1.0 - p);

    ComplianceFields {
        limit,
        k: expanded.k,
        u: expanded.u,
        excess,
        margin,
        upper,
        z,
        p_compliance,
        p_exceedance,
        decision: decide(level, limit, margin),
    }
}

/// The all-undefined compliance row used when the station has no limit
/// entry: the batch keeps going, the columns stay blank.
pub fn undefined_fields() -> ComplianceFields {
    ComplianceFields {
        limit: Level::Undefined,
        k: Level::Undefined,
        u: Level::Undefined,
        excess: Level::Undefined,
        margin: Level::Undefined,
        upper: Level::Undefined,
        z: Level::Undefined,
        p_compliance: Level::Undefined,
        p_exceedance: Level::Undefined,
        decision: Decision::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64) -> Level {
        Level::Value(x)
    }

    #[test]
    fn negative_margin_reference_cases() {
        // level 50, limit 55, w = −2 (Au = 57): pass.
        assert_eq!(decide(v(50.0), v(55.0), v(-2.0)), Decision::Pass);
        // level 56 is over the limit but inside Au: conditional pass.
        assert_eq!(decide(v(56.0), v(55.0), v(-2.0)), Decision::ConditionalPass);
        // level 58 is past Au: fail.
        assert_eq!(decide(v(58.0), v(55.0), v(-2.0)), Decision::Fail);
    }

    #[test]
    fn positive_margin_has_four_bands() {
        // w = 2, limit 55, Au = 53.
        assert_eq!(decide(v(52.0), v(55.0), v(2.0)), Decision::Pass);
        assert_eq!(decide(v(54.0), v(55.0), v(2.0)), Decision::ConditionalPass);
        assert_eq!(decide(v(56.0), v(55.0), v(2.0)), Decision::ConditionalFail);
        assert_eq!(decide(v(58.0), v(55.0), v(2.0)), Decision::Fail);
    }

    #[test]
    fn zero_or_missing_margin_is_undecidable() {
        assert_eq!(decide(v(50.0), v(55.0), v(0.0)), Decision::Undefined);
        assert_eq!(decide(v(50.0), v(55.0), Level::Undefined), Decision::Undefined);
        assert_eq!(decide(v(50.0), Level::Undefined, v(-2.0)), Decision::Undefined);
    }

    #[test]
    fn evaluate_fills_the_derived_columns() {
        let expanded = Expanded {
            k: v(2.0),
            u: v(1.5),
        };
        let fields = evaluate(v(56.0), v(55.0), &expanded);
        assert_eq!(fields.excess, v(1.0));
        assert_eq!(fields.margin, v(-1.5));
        assert_eq!(fields.upper, v(56.5));
        // Z = (55 − 56)/(1.5/2) = −4/3.
        assert!((fields.z.value().unwrap() + 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(fields.decision, Decision::ConditionalPass);
        // The measured level sits above the limit, so compliance probability
        // is below one half and exceedance above.
        let p = fields.p_compliance.value().unwrap();
        assert!(p < 0.5);
        let pe = fields.p_exceedance.value().unwrap();
        assert!((p + pe - 1.0).abs() < 1e-12);
    }

    #[test]
    fn level_below_limit_has_high_compliance_probability() {
        let expanded = Expanded {
            k: v(2.0),
            u: v(1.0),
        };
        let fields = evaluate(v(50.0), v(55.0), &expanded);
        assert!(fields.p_compliance.value().unwrap() > 0.99);
        assert_eq!(fields.decision, Decision::Pass);
    }

    #[test]
    fn undefined_uncertainty_blanks_the_probabilistic_columns() {
        let fields = evaluate(v(56.0), v(55.0), &Expanded::undefined());
        assert_eq!(fields.margin, Level::Undefined);
        assert_eq!(fields.z, Level::Undefined);
        assert_eq!(fields.p_compliance, Level::Undefined);
        assert_eq!(fields.decision, Decision::Undefined);
        // The excess column only needs the level and the limit.
        assert_eq!(fields.excess, v(1.0));
    }
}
