use firmsim::{FirmError, Firms};

fn seeded(n_firms: usize) -> Firms {
    Firms::with_seed(n_firms, 20130101)
}

#[test]
fn defaults_follow_lengnick() {
    let firms = seeded(3);

    assert_eq!(firms.property("gamma").unwrap(), vec![24.0; 3]);
    assert_eq!(firms.property("delta").unwrap(), vec![0.019; 3]);
    assert_eq!(firms.property("i_phi_lower").unwrap(), vec![0.25; 3]);
    assert_eq!(firms.property("i_phi_upper").unwrap(), vec![1.0; 3]);
    assert_eq!(firms.property("nu").unwrap(), vec![0.02; 3]);
    assert_eq!(firms.property("p_phi_lower").unwrap(), vec![1.025; 3]);
    assert_eq!(firms.property("p_phi_upper").unwrap(), vec![1.15; 3]);
    assert_eq!(firms.property("theta").unwrap(), vec![0.75; 3]);
    assert_eq!(firms.property("t_lambda").unwrap(), vec![3.0; 3]);

    assert_eq!(firms.m(), &[0.0; 3]);
    assert_eq!(firms.i(), &[5.0; 3]);
    assert_eq!(firms.d(), &[5.0; 3]);
    assert_eq!(firms.w(), &[1.0; 3]);
    assert_eq!(firms.p(), &[1.0; 3]);
    assert_eq!(firms.l(), &[1; 3]);
    assert_eq!(firms.v(), &[1; 3]);
    assert_eq!(firms.nv(), &[0; 3]);
}

#[test]
fn adjust_wages() {
    let mut firms = seeded(5);

    firms.set_property("delta", [0.1, 0.2, 0.3, 0.4, 0.5], None).unwrap();
    firms.set_property("gamma", [23.0, 24.0, 24.0, 24.0, 25.0], None).unwrap();
    firms.set_property("v", [0.0, 1.0, 0.0, 2.0, 0.0], None).unwrap();
    firms.set_property("nv", [24.0, 0.0, 24.0, 0.0, 24.0], None).unwrap();
    // Firms 1 and 3 are short of inventory: 1 < 0.25 * 5.
    firms.set_property("i", [5.0, 1.0, 5.0, 1.0, 5.0], None).unwrap();
    firms.set_property("w", 1.0, None).unwrap();

    let w_old = firms.w().to_vec();
    firms.adjust_wages().unwrap();
    let w = firms.w();

    // vacancy-free for more than gamma months: cut by less than delta
    assert!(w[0] < w_old[0]);
    assert!(w[0] >= w_old[0] * (1.0 - 0.1));

    // unfilled vacancy, still short: raised by at most delta
    assert!(w[1] > w_old[1]);
    assert!(w[1] <= w_old[1] * (1.0 + 0.2));

    // vacancy-free for exactly gamma months: cut
    assert!(w[2] < w_old[2]);
    assert!(w[2] >= w_old[2] * (1.0 - 0.3));

    // two unfilled vacancies, still short: raised
    assert!(w[3] > w_old[3]);
    assert!(w[3] <= w_old[3] * (1.0 + 0.4));

    // vacancy-free for fewer than gamma months: unchanged
    assert_eq!(w[4], w_old[4]);
}

#[test]
fn wages_hold_without_look_ahead_signal() {
    let mut firms = seeded(2);

    // Open vacancy, but inventory no longer short.
    firms.set_property("v", [1.0, 0.0], None).unwrap();
    firms.set_property("nv", [0.0, 30.0], None).unwrap();
    // Long streak, but inventory short again.
    firms.set_property("i", [5.0, 1.0], None).unwrap();

    firms.adjust_wages().unwrap();

    assert_eq!(firms.w(), &[1.0, 1.0]);
}

#[test]
fn wages_reject_vacancy_conflict() {
    let mut firms = seeded(4);

    firms.set_property("v", [0.0, 0.0, 1.0, 1.0], None).unwrap();
    firms.set_property("nv", [3.0, 0.0, 2.0, 5.0], None).unwrap();
    firms.set_property("w", [1.0, 2.0, 3.0, 4.0], None).unwrap();

    let err = firms.adjust_wages().unwrap_err();
    assert_eq!(err, FirmError::VacancyConflict { id: 2, v: 1, nv: 2 });
    assert_eq!(firms.w(), &[1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn wages_are_not_bounded_below() {
    let mut firms = seeded(1);

    firms.set_property("delta", 1.0, None).unwrap();
    firms.set_property("gamma", 0.0, None).unwrap();
    firms.set_property("v", 0.0, None).unwrap();

    for _ in 0..200 {
        firms.adjust_wages().unwrap();
    }

    assert!(firms.w()[0] < 1e-3);
}

#[test]
fn adjust_workforce() {
    let mut firms = seeded(7);

    firms.set_property("i_phi_upper", 1.0, None).unwrap();
    firms.set_property("i_phi_lower", 0.25, None).unwrap();
    firms.set_property("d", [1.0, 2.0, 5.0, 6.0, 20.0, 25.0, 30.0], None).unwrap();
    firms.set_property("i", 5.0, None).unwrap();
    firms.set_property("v", [0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0], None).unwrap();
    firms.set_property("nv", [4.0, 0.0, 7.0, 0.0, 1.0, 2.0, 0.0], None).unwrap();
    firms.set_property("l", [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0], None).unwrap();

    firms.adjust_workforce();

    // Firms 0 and 1 are above the upper limit, 2 sits on it, 3 is between
    // the limits, 4 sits on the lower limit, 5 and 6 are below it.
    assert_eq!(firms.l(), &[0, 0, 2, 3, 4, 5, 6]);
    assert_eq!(firms.v(), &[0, 0, 0, 0, 0, 1, 1]);
    assert_eq!(firms.nv(), &[5, 1, 8, 1, 2, 0, 0]);
}

#[test]
fn workforce_keeps_state_at_bounds() {
    let mut firms = seeded(2);

    // i equals the upper bound for firm 0 and the lower bound for firm 1.
    firms.set_property("d", [4.0, 16.0], None).unwrap();
    firms.set_property("i", 4.0, None).unwrap();
    firms.set_property("v", 0.0, None).unwrap();
    firms.set_property("l", 3.0, None).unwrap();

    for _ in 0..3 {
        firms.adjust_workforce();
        assert_eq!(firms.l(), &[3, 3]);
        assert_eq!(firms.v(), &[0, 0]);
    }
    assert_eq!(firms.nv(), &[3, 3]);
}

fn single_price_firm(i: f64) -> Firms {
    let mut firms = seeded(1);
    firms.set_property("i", i, None).unwrap();
    firms.set_property("d", 5.0, None).unwrap();
    firms.set_property("i_phi_lower", 0.4, None).unwrap();
    firms.set_property("i_phi_upper", 1.0, None).unwrap();
    firms.set_property("p", 1.0, None).unwrap();
    firms.set_property("w", 1.0, None).unwrap();
    firms.set_property("t_lambda", 1.0, None).unwrap();
    firms.set_property("p_phi_lower", 0.0, None).unwrap();
    firms.set_property("p_phi_upper", 100.0, None).unwrap();
    firms.set_property("nu", 0.05, None).unwrap();
    firms.set_property("theta", 1.0, None).unwrap();
    firms
}

#[test]
fn price_rises_when_short() {
    let mut firms = single_price_firm(1.0);

    firms.adjust_prices();

    let p = firms.p()[0];
    assert!(p > 1.0);
    assert!(p < 1.05);
}

#[test]
fn price_falls_when_in_excess() {
    let mut firms = single_price_firm(6.0);

    firms.adjust_prices();

    let p = firms.p()[0];
    assert!(p < 1.0);
    assert!(p > 0.95);
}

#[test]
fn price_clamps_to_bound() {
    let mut firms = single_price_firm(1.0);
    firms.set_property("w", 5.5, None).unwrap();
    firms.set_property("p_phi_lower", 1.0, None).unwrap();
    firms.set_property("p_phi_upper", 1.2, None).unwrap();
    firms.set_property("nu", 0.9, None).unwrap();

    firms.adjust_prices();

    assert_eq!(firms.p()[0], 5.5);
}

#[test]
fn price_snaps_down_to_band() {
    let mut firms = single_price_firm(6.0);
    firms.set_property("p", 2.0, None).unwrap();
    firms.set_property("p_phi_lower", 1.025, None).unwrap();
    firms.set_property("p_phi_upper", 1.15, None).unwrap();

    firms.adjust_prices();

    assert_eq!(firms.p()[0], 1.15);
}

#[test]
fn price_above_band_holds_when_short() {
    let mut firms = single_price_firm(1.0);
    firms.set_property("p", 2.0, None).unwrap();
    firms.set_property("p_phi_lower", 1.025, None).unwrap();
    firms.set_property("p_phi_upper", 1.15, None).unwrap();

    firms.adjust_prices();

    assert_eq!(firms.p()[0], 2.0);
}

#[test]
fn price_holds_when_balanced() {
    let mut firms = single_price_firm(3.0);
    firms.set_property("nu", 0.9, None).unwrap();

    for _ in 0..10 {
        firms.adjust_prices();
        assert_eq!(firms.p()[0], 1.0);
    }
}

#[test]
fn price_never_changes_with_zero_theta() {
    let mut firms = seeded(2);
    firms.set_property("i", [0.0, 50.0], None).unwrap();
    firms.set_property("p", [1.0, 10.0], None).unwrap();
    firms.set_property("nu", 0.5, None).unwrap();
    firms.set_property("theta", 0.0, None).unwrap();

    for _ in 0..10 {
        firms.adjust_prices();
        assert_eq!(firms.p(), &[1.0, 10.0]);
    }
}

#[test]
fn theta_above_one_always_accepts() {
    let mut firms = single_price_firm(1.0);
    firms.set_property("theta", 1.5, None).unwrap();

    for _ in 0..10 {
        let p_old = firms.p()[0];
        firms.adjust_prices();
        assert!(firms.p()[0] > p_old);
    }
}

#[test]
fn theta_below_zero_or_nan_never_accepts() {
    let mut firms = single_price_firm(1.0);

    for theta in [-0.5, f64::NAN] {
        firms.set_property("theta", theta, None).unwrap();
        for _ in 0..10 {
            firms.adjust_prices();
            assert_eq!(firms.p()[0], 1.0);
        }
    }
}

#[test]
fn non_positive_change_limits_keep_state() {
    let mut firms = single_price_firm(1.0);
    firms.set_property("nu", 0.0, None).unwrap();
    firms.set_property("delta", -0.5, None).unwrap();
    firms.set_property("v", 1u32, None).unwrap();

    firms.adjust_prices();
    firms.adjust_wages().unwrap();

    assert_eq!(firms.p()[0], 1.0);
    assert_eq!(firms.w()[0], 1.0);
}

#[test]
fn reseeding_replays_decisions() {
    let mut firms_a = seeded(10);
    firms_a.set_property("i", 0.0, None).unwrap();
    let mut firms_b = firms_a.clone();

    firms_a.reseed(7);
    firms_b.reseed(7);
    firms_a.adjust_wages().unwrap();
    firms_b.adjust_wages().unwrap();
    firms_a.adjust_prices();
    firms_b.adjust_prices();

    assert_eq!(firms_a.w(), firms_b.w());
    assert_eq!(firms_a.p(), firms_b.p());
}
