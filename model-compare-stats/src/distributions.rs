//! Distribution helpers on top of `statrs`, plus the studentized range
//! distribution used by Tukey HSD.
//!
//! The studentized range CDF follows Copenhaver & Holland (1988), "Computation
//! of the distribution of the maximum studentized range statistic with
//! application to multiple significance testing of simple effects", evaluated
//! with Gauss-Legendre quadrature.

use model_compare_core::{CoreError, Result};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal, StudentsT};
use statrs::function::gamma::ln_gamma;
use std::f64::consts::LN_2;

fn numerical<T, E: std::fmt::Display>(result: std::result::Result<T, E>) -> Result<T> {
    result.map_err(|e| CoreError::Numerical(e.to_string()))
}

pub fn standard_normal() -> Result<Normal> {
    numerical(Normal::new(0.0, 1.0))
}

/// Upper tail of F(d1, d2).
pub fn f_sf(f: f64, d1: f64, d2: f64) -> Result<f64> {
    if f.is_infinite() {
        return Ok(0.0);
    }
    let dist = numerical(FisherSnedecor::new(d1, d2))?;
    Ok(dist.sf(f))
}

/// Upper tail of chi-squared with `df` degrees of freedom.
pub fn chi2_sf(x: f64, df: f64) -> Result<f64> {
    let dist = numerical(ChiSquared::new(df))?;
    Ok(dist.sf(x))
}

/// Two-sided p-value of a t statistic.
pub fn t_two_sided(t: f64, df: f64) -> Result<f64> {
    if t.is_infinite() {
        return Ok(0.0);
    }
    let dist = numerical(StudentsT::new(0.0, 1.0, df))?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

/// Two-sided p-value of a standard normal z score.
pub fn z_two_sided(z: f64) -> Result<f64> {
    let dist = standard_normal()?;
    Ok((2.0 * dist.sf(z.abs())).min(1.0))
}

// ---------------------------------------------------------------------------
// Studentized range
// ---------------------------------------------------------------------------

const SQRT_2PI: f64 = 2.506_628_274_631_000_7;

// Inner integral (range of `cc` standard normals)
const NLEG: usize = 12;
const IHALF: usize = 6;
const C1: f64 = -30.0;
const C2: f64 = -50.0;
const C3: f64 = 60.0;
const BB: f64 = 8.0;
const WLAR: f64 = 3.0;
const WINCR1: usize = 2;
const WINCR2: usize = 3;
const XLEG: [f64; IHALF] = [
    0.981_560_634_246_719_250_690_549_090_149,
    0.904_117_256_370_474_856_678_465_866_119,
    0.769_902_674_194_304_687_036_893_833_213,
    0.587_317_954_286_617_447_296_702_418_941,
    0.367_831_498_998_180_193_752_691_536_644,
    0.125_233_408_511_468_915_472_441_369_464,
];
const ALEG: [f64; IHALF] = [
    0.047_175_336_386_511_827_194_615_961_485,
    0.106_939_325_995_318_430_960_254_718_194,
    0.160_078_328_543_346_226_334_652_529_543,
    0.203_167_426_723_065_921_749_064_455_810,
    0.233_492_536_538_354_808_760_849_898_925,
    0.249_147_045_813_402_785_000_562_436_043,
];

// Outer integral (chi distribution of the variance estimate)
const NLEGQ: usize = 16;
const IHALFQ: usize = 8;
const EPS1: f64 = -30.0;
const EPS2: f64 = 1.0e-14;
const DHAF: f64 = 100.0;
const DQUAR: f64 = 800.0;
const DEIGH: f64 = 5000.0;
const DLARG: f64 = 25000.0;
const XLEGQ: [f64; IHALFQ] = [
    0.989_400_934_991_649_932_596_154_173_450,
    0.944_575_023_073_232_576_077_988_415_535,
    0.865_631_202_387_831_743_880_467_897_712,
    0.755_404_408_355_003_033_895_101_194_847,
    0.617_876_244_402_643_748_446_671_764_049,
    0.458_016_777_657_227_386_342_419_442_984,
    0.281_603_550_779_258_913_230_460_501_460,
    0.095_012_509_837_637_440_185_319_335_425,
];
const ALEGQ: [f64; IHALFQ] = [
    0.027_152_459_411_754_094_851_780_572_456,
    0.062_253_523_938_647_892_862_843_836_994,
    0.095_158_511_682_492_784_809_925_107_602,
    0.124_628_971_255_533_872_052_476_282_192,
    0.149_595_988_816_576_732_081_501_730_547,
    0.169_156_519_395_002_538_189_312_079_030,
    0.182_603_415_044_923_588_866_763_667_969,
    0.189_450_610_455_068_496_285_396_723_208,
];

/// P(range of `cc` iid standard normals < w), raised to `rr` ranges.
fn wprob(w: f64, rr: f64, cc: f64, norm: &Normal) -> f64 {
    let qsqz = w * 0.5;
    if qsqz >= BB {
        return 1.0;
    }

    // (2Φ(w/2) − 1)^cc, the first term of Hartley's form
    let mut pr_w = 2.0 * norm.cdf(qsqz) - 1.0;
    pr_w = if pr_w >= (C2 / cc).exp() {
        pr_w.powf(cc)
    } else {
        0.0
    };

    let wincr = if w > WLAR { WINCR1 } else { WINCR2 };
    let binc = (BB - qsqz) / wincr as f64;
    let mut blb = qsqz;
    let mut bub = blb + binc;
    let mut einsum = 0.0;
    let cc1 = cc - 1.0;

    for _ in 0..wincr {
        let mut elsum = 0.0;
        let a = 0.5 * (bub + blb);
        let b = 0.5 * (bub - blb);

        for jj in 1..=NLEG {
            let (j, xx) = if IHALF < jj {
                let j = NLEG - jj + 1;
                (j, XLEG[j - 1])
            } else {
                (jj, -XLEG[jj - 1])
            };
            let ac = a + b * xx;

            // exp(-qexpo/2) below 9e-14 no longer contributes
            let qexpo = ac * ac;
            if qexpo > C3 {
                break;
            }

            let pplus = 2.0 * norm.cdf(ac);
            let pminus = 2.0 * norm.cdf(ac - w);
            let rinsum = pplus * 0.5 - pminus * 0.5;
            if rinsum >= (C1 / cc1).exp() {
                elsum += ALEG[j - 1] * (-(0.5 * qexpo)).exp() * rinsum.powf(cc1);
            }
        }

        elsum *= 2.0 * b * cc / SQRT_2PI;
        einsum += elsum;
        blb = bub;
        bub += binc;
    }

    pr_w += einsum;
    if pr_w <= (C1 / rr).exp() {
        return 0.0;
    }
    pr_w.powf(rr).min(1.0)
}

/// CDF of the studentized range for `groups` means and `df` error degrees of
/// freedom.
pub fn ptukey(q: f64, groups: f64, df: f64) -> Result<f64> {
    let rr = 1.0;

    if df < 2.0 || groups < 2.0 {
        return Err(CoreError::InvalidInput(format!(
            "studentized range needs at least 2 groups and 2 degrees of freedom (groups={}, df={})",
            groups, df
        )));
    }
    if q <= 0.0 {
        return Ok(0.0);
    }
    if !q.is_finite() {
        return Ok(1.0);
    }

    let norm = standard_normal()?;
    if df > DLARG {
        return Ok(wprob(q, rr, groups, &norm));
    }

    let f2 = df * 0.5;
    let mut f2lf = f2 * df.ln() - df * LN_2 - ln_gamma(f2);
    let f21 = f2 - 1.0;
    let ff4 = df * 0.25;

    let ulen = if df <= DHAF {
        1.0
    } else if df <= DQUAR {
        0.5
    } else if df <= DEIGH {
        0.25
    } else {
        0.125
    };
    f2lf += f64::ln(ulen);

    let mut ans = 0.0;
    for i in 1..=50 {
        let mut otsum = 0.0;
        let twa1 = (2 * i - 1) as f64 * ulen;

        for jj in 1..=NLEGQ {
            let (j, node) = if IHALFQ < jj {
                let j = jj - IHALFQ - 1;
                (j, twa1 + XLEGQ[j] * ulen)
            } else {
                let j = jj - 1;
                (j, twa1 - XLEGQ[j] * ulen)
            };

            let t1 = f2lf + f21 * node.ln() - node * ff4;
            if t1 >= EPS1 {
                let qsqz = q * (node * 0.5).sqrt();
                otsum += wprob(qsqz, rr, groups, &norm) * ALEGQ[j] * t1.exp();
            }
        }

        // At least 1/ulen intervals, then stop once the tail is negligible
        if i as f64 * ulen >= 1.0 && otsum <= EPS2 {
            break;
        }
        ans += otsum;
    }

    Ok(ans.min(1.0))
}

/// Quantile of the studentized range, by bisection on [`ptukey`].
pub fn qtukey(prob: f64, groups: f64, df: f64) -> Result<f64> {
    if !(prob > 0.0 && prob < 1.0) {
        return Err(CoreError::InvalidInput(format!(
            "studentized range quantile needs 0 < p < 1, got {}",
            prob
        )));
    }

    let mut lo = 0.0;
    let mut hi = 8.0;
    while ptukey(hi, groups, df)? < prob {
        lo = hi;
        hi *= 2.0;
        if hi > 1.0e6 {
            return Err(CoreError::Numerical(
                "studentized range quantile did not bracket".to_string(),
            ));
        }
    }

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if ptukey(mid, groups, df)? < prob {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1.0e-9 {
            break;
        }
    }

    Ok(0.5 * (lo + hi))
}
