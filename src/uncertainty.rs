use crate::levels::Level;
use crate::meteorology::MetRanges;
use crate::summary::PeriodSummary;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Sound-level-meter standard uncertainty (dB).
pub const SLM_UNCERTAINTY: f64 = 0.5;
/// Microphone temperature sensitivity (dB/°C).
pub const TEMP_COEFF: f64 = -0.007;
/// Microphone pressure sensitivity (dB/kPa).
pub const PRESSURE_COEFF: f64 = -0.010;
/// Fixed microphone humidity term (dB).
pub const HUMIDITY_UNCERTAINTY: f64 = 0.1;

/// Standard-defined degrees of freedom per instrumental component.
pub const SLM_DOF: f64 = 50.0;
pub const MIC_DOF: f64 = 200.0;
pub const SITING_DOF: f64 = 50.0;

const ALPHA: f64 = 0.05;

/// Display resolution term: a 0.1 dB readout quantization assumed uniform,
/// `0.1/√12`, rounded to 3 decimals.
pub fn resolution_uncertainty() -> f64 {
    let u = 0.1 / 12f64.sqrt();
    (u * 1000.0).round() / 1000.0
}

/// The uncertainty budget of one summary row: every component that enters
/// the quadrature sum, plus the sample count backing the type-A term.
#[derive(Debug, Clone, Copy)]
pub struct UncertaintyBudget {
    pub siting: f64,
    pub umic_t: Level,
    pub umic_p: Level,
    pub umic_h: f64,
    pub uslm: f64,
    pub uresol: f64,
    pub type_a: Level,
    pub count: usize,
}

/// Expanded uncertainty of one summary row: the Student-t coverage factor at
/// the effective degrees of freedom and the resulting interval half-width.
#[derive(Debug, Clone, Copy)]
pub struct Expanded {
    pub k: Level,
    pub u: Level,
}

impl Expanded {
    pub fn undefined() -> Expanded {
        Expanded {
            k: Level::Undefined,
            u: Level::Undefined,
        }
    }
}

/// Type-A standard uncertainty in dB, from the level and its energy-domain
/// standard error: `u = 10·log10(10^(0.1·Lk) + s) − Lk`.
pub fn type_a_uncertainty(lraseq_k: Level, s: Level) -> Level {
    lraseq_k.zip(s, |lk, se| 10.0 * (10f64.powf(0.1 * lk) + se).log10() - lk)
}

/// Assembles the component budget for one summary row from the period's
/// meteorological ranges and the configured siting uncertainty.
pub fn budget(summary: &PeriodSummary, ranges: &MetRanges, siting: f64) -> UncertaintyBudget {
    UncertaintyBudget {
        siting,
        umic_t: ranges.delta_temp.map(|dt| dt * TEMP_COEFF.abs()),
        umic_p: ranges.delta_pressure.map(|dp| dp * PRESSURE_COEFF.abs()),
        umic_h: HUMIDITY_UNCERTAINTY,
        uslm: SLM_UNCERTAINTY,
        uresol: resolution_uncertainty(),
        type_a: type_a_uncertainty(summary.lraseq_k, summary.s),
        count: summary.count,
    }
}

/// Combined standard uncertainty: quadrature sum of all components. Any
/// undefined component leaves the result undefined.
pub fn combined(b: &UncertaintyBudget) -> Level {
    let fixed = b.siting * b.siting
        + b.umic_h * b.umic_h
        + b.uslm * b.uslm
        + b.uresol * b.uresol;
    b.umic_t
        .zip(b.umic_p, |t, p| t * t + p * p)
        .zip(b.type_a, |met, ua| (fixed + met + ua * ua).sqrt())
}

/// Welch–Satterthwaite effective degrees of freedom, rounded to the nearest
/// integer value (kept as f64 for the continuous t quantile).
pub fn effective_dof(b: &UncertaintyBudget, combined_u: Level) -> Level {
    if b.count < 2 {
        return Level::Undefined;
    }
    let statistical_dof = b.count as f64 - 1.0;

    let (Some(uc), Some(ua), Some(ut), Some(up)) = (
        combined_u.value(),
        b.type_a.value(),
        b.umic_t.value(),
        b.umic_p.value(),
    ) else {
        return Level::Undefined;
    };

    let denom = ua.powi(4) / statistical_dof
        + b.uslm.powi(4) / SLM_DOF
        + ut.powi(4) / MIC_DOF
        + up.powi(4) / MIC_DOF
        + b.umic_h.powi(4) / MIC_DOF
        + b.siting.powi(4) / SITING_DOF;
    if denom <= 0.0 {
        return Level::Undefined;
    }
    Level::new((uc.powi(4) / denom).round())
}

/// Two-sided 95% Student-t coverage factor at (continuous) `veff`.
pub fn coverage_factor(veff: Level) -> Level {
    match veff.value() {
        Some(dof) if dof > 0.0 => match StudentsT::new(0.0, 1.0, dof) {
            Ok(dist) => Level::new(dist.inverse_cdf(1.0 - ALPHA / 2.0)),
            Err(_) => Level::Undefined,
        },
        _ => Level::Undefined,
    }
}

/// Full expansion for one summary row: combined uncertainty, effective
/// degrees of freedom, coverage factor and `U = K·u_c`.
pub fn expand(b: &UncertaintyBudget) -> Expanded {
    let uc = combined(b);
    let veff = effective_dof(b, uc);
    let k = coverage_factor(veff);
    Expanded {
        k,
        u: k.zip(uc, |kf, u| kf * u),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_a_only(ua: f64, count: usize) -> UncertaintyBudget {
        UncertaintyBudget {
            siting: 0.0,
            umic_t: Level::Value(0.0),
            umic_p: Level::Value(0.0),
            umic_h: 0.0,
            uslm: 0.0,
            uresol: 0.0,
            type_a: Level::Value(ua),
            count,
        }
    }

    #[test]
    fn resolution_term_matches_the_uniform_quantization_model() {
        assert_eq!(resolution_uncertainty(), 0.029);
    }

    #[test]
    fn type_a_uncertainty_grows_with_the_standard_error() {
        let low = type_a_uncertainty(Level::Value(60.0), Level::Value(1.0e4))
            .value()
            .unwrap();
        let high = type_a_uncertainty(Level::Value(60.0), Level::Value(1.0e5))
            .value()
            .unwrap();
        assert!(high > low);
        assert!(low > 0.0);
    }

    #[test]
    fn type_a_uncertainty_is_undefined_without_dispersion() {
        assert_eq!(
            type_a_uncertainty(Level::Value(60.0), Level::Undefined),
            Level::Undefined
        );
    }

    #[test]
    fn combined_is_the_quadrature_sum() {
        let b = UncertaintyBudget {
            siting: 0.3,
            umic_t: Level::Value(0.056),
            umic_p: Level::Value(0.01),
            umic_h: 0.1,
            uslm: 0.5,
            uresol: 0.029,
            type_a: Level::Value(0.4),
            count: 10,
        };
        let expected = (0.3f64.powi(2)
            + 0.056f64.powi(2)
            + 0.01f64.powi(2)
            + 0.1f64.powi(2)
            + 0.5f64.powi(2)
            + 0.029f64.powi(2)
            + 0.4f64.powi(2))
        .sqrt();
        let got = combined(&b).value().unwrap();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn undefined_met_range_poisons_the_whole_budget() {
        let mut b = type_a_only(0.4, 10);
        b.umic_t = Level::Undefined;
        assert_eq!(combined(&b), Level::Undefined);
        assert_eq!(expand(&b).u, Level::Undefined);
    }

    #[test]
    fn pure_type_a_effective_dof_reduces_to_n_minus_one() {
        for count in [5, 12, 31] {
            let b = type_a_only(0.7, count);
            let uc = combined(&b);
            assert_eq!(
                effective_dof(&b, uc),
                Level::Value(count as f64 - 1.0)
            );
        }
    }

    #[test]
    fn single_sample_effective_dof_is_undefined() {
        let b = type_a_only(0.7, 1);
        let uc = combined(&b);
        assert_eq!(effective_dof(&b, uc), Level::Undefined);
    }

    #[test]
    fn coverage_factor_approaches_the_gaussian_limit() {
        // t(0.975, 4) ≈ 2.776; large dof tends to 1.96.
        let small = coverage_factor(Level::Value(4.0)).value().unwrap();
        assert!((small - 2.776).abs() < 0.01);
        let large = coverage_factor(Level::Value(1.0e6)).value().unwrap();
        assert!((large - 1.96).abs() < 0.01);
        assert_eq!(coverage_factor(Level::Undefined), Level::Undefined);
    }

    #[test]
    fn expansion_multiplies_coverage_by_combined() {
        let b = type_a_only(0.7, 5);
        let exp = expand(&b);
        let k = exp.k.value().unwrap();
        let u = exp.u.value().unwrap();
        assert!((u - k * 0.7).abs() < 1e-12);
    }
}
