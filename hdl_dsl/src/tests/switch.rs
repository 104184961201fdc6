use crate::diagnostic::DiagnosticKind;
use crate::dsl::Module;
use crate::error::BuildErrorKind;
use crate::hdl::statement::Statement;
use crate::tests::{render_domain, sig};

#[test]
fn cases_and_default() {
    let s = sig("s", 2);
    let x = sig("x", 2);

    let mut m = Module::new();
    m.switch(&s, |m| {
        m.case([0], |m| m.comb(x.assign(1)))?;
        m.case(["1-"], |m| m.comb(x.assign(2)))?;
        m.default(|m| m.comb(x.assign(3)))
    })
    .unwrap();
    let fragment = m.elaborate(None).unwrap();

    let expected = "\
switch (sig s)
  case 0
    (eq (sig x) (const 1'd1))
  case 1-
    (eq (sig x) (const 2'd2))
  default
    (eq (sig x) (const 2'd3))
";
    assert_eq!(render_domain(&fragment, "comb"), expected);
}

#[test]
fn duplicate_case_keeps_first() {
    let s = sig("s", 2);
    let x = sig("x", 2);

    let mut m = Module::new();
    m.switch(&s, |m| {
        m.case([1], |m| m.comb(x.assign(1)))?;
        m.case([1], |m| m.comb(x.assign(2)))
    })
    .unwrap();
    let fragment = m.elaborate(None).unwrap();

    let expected = "\
switch (sig s)
  case 1
    (eq (sig x) (const 1'd1))
";
    assert_eq!(render_domain(&fragment, "comb"), expected);
}

#[test]
fn multiple_patterns_in_one_case() {
    let s = sig("s", 3);
    let x = sig("x", 1);

    let mut m = Module::new();
    m.switch(&s, |m| m.case([1, 2, 5], |m| m.sync(x.assign(1)))).unwrap();
    let fragment = m.elaborate(None).unwrap();

    let expected = "\
switch (sig s)
  case 1 2 5
    (eq (sig x) (const 1'd1))
";
    assert_eq!(render_domain(&fragment, "sync"), expected);
}

#[test]
fn oversized_pattern_is_dead() {
    let s = sig("s", 2);
    let x = sig("x", 1);

    let mut m = Module::new();
    m.switch(&s, |m| m.case([5], |m| m.comb(x.assign(1)))).unwrap();
    let fragment = m.elaborate(None).unwrap();

    assert_eq!(fragment.diagnostics.len(), 1);
    let diag = &fragment.diagnostics[0];
    assert_eq!(diag.kind, DiagnosticKind::DeadCase);
    assert!(diag.title.contains("wider than switch value"));
    assert!(fragment.statements.is_empty());
}

#[test]
fn oversized_pattern_keeps_other_patterns() {
    let s = sig("s", 2);
    let x = sig("x", 1);

    let mut m = Module::new();
    m.switch(&s, |m| m.case([8, 3], |m| m.comb(x.assign(1)))).unwrap();
    let fragment = m.elaborate(None).unwrap();

    let expected = "\
switch (sig s)
  case 3
    (eq (sig x) (const 1'd1))
";
    assert_eq!(render_domain(&fragment, "comb"), expected);
    assert_eq!(fragment.diagnostics.len(), 1);
}

#[test]
fn zero_pattern_fits_zero_width() {
    let s = sig("s", 0);
    let x = sig("x", 1);

    let mut m = Module::new();
    m.switch(&s, |m| m.case([0], |m| m.comb(x.assign(1)))).unwrap();
    let fragment = m.elaborate(None).unwrap();

    assert!(fragment.diagnostics.is_empty());
    assert_eq!(fragment.statements["comb"].len(), 1);
}

#[test]
fn bit_pattern_whitespace_is_removed() {
    let s = sig("s", 4);
    let x = sig("x", 1);

    let mut m = Module::new();
    m.switch(&s, |m| m.case(["10 -1"], |m| m.comb(x.assign(1)))).unwrap();
    let fragment = m.elaborate(None).unwrap();

    let expected = "\
switch (sig s)
  case 10-1
    (eq (sig x) (const 1'd1))
";
    assert_eq!(render_domain(&fragment, "comb"), expected);
}

#[test]
fn bit_pattern_errors() {
    let s = sig("s", 2);

    let mut m = Module::new();
    let err = m.switch(&s, |m| m.case(["1x"], |_| Ok(()))).unwrap_err();
    assert_eq!(err.kind, BuildErrorKind::Pattern);
    assert!(err.message.contains("must consist of 0, 1, and - (don't care) bits"));

    let mut m = Module::new();
    let err = m.switch(&s, |m| m.case(["101"], |_| Ok(()))).unwrap_err();
    assert_eq!(err.kind, BuildErrorKind::Pattern);
    assert!(err.message.contains("must have the same width as switch value (which is 2)"));
}

#[test]
fn non_constant_pattern() {
    let s = sig("s", 2);
    let t = sig("t", 2);

    let mut m = Module::new();
    let err = m.switch(&s, |m| m.case([&t], |_| Ok(()))).unwrap_err();
    assert_eq!(err.kind, BuildErrorKind::Pattern);
    assert!(err.message.contains("constant-castable"));
}

#[test]
fn case_after_default_is_reported_but_kept() {
    let s = sig("s", 2);
    let x = sig("x", 2);

    let mut m = Module::new();
    m.switch(&s, |m| {
        m.default(|m| m.comb(x.assign(1)))?;
        m.case([2], |m| m.comb(x.assign(2)))
    })
    .unwrap();
    assert_eq!(m.diagnostics().len(), 1);
    assert_eq!(m.diagnostics()[0].kind, DiagnosticKind::CaseAfterDefault);
    let fragment = m.elaborate(None).unwrap();

    let expected = "\
switch (sig s)
  default
    (eq (sig x) (const 1'd1))
  case 2
    (eq (sig x) (const 2'd2))
";
    assert_eq!(render_domain(&fragment, "comb"), expected);
}

#[test]
fn every_domain_gets_every_case() {
    let s = sig("s", 2);
    let x = sig("x", 1);
    let y = sig("y", 1);

    let mut m = Module::new();
    m.switch(&s, |m| {
        m.case([0], |m| m.comb(x.assign(1)))?;
        m.case([1], |m| m.sync(y.assign(1)))?;
        m.case([2], |_| Ok(()))?;
        m.default(|m| m.comb(x.assign(0)))
    })
    .unwrap();
    let fragment = m.elaborate(None).unwrap();

    for domain in ["comb", "sync"] {
        let statements = &fragment.statements[domain];
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Statement::Switch(switch) => assert_eq!(switch.cases.len(), 4),
            other => panic!("expected switch, got {:?}", other),
        }
    }
    assert_eq!(fragment.driver_domain(&x), Some("comb"));
    assert_eq!(fragment.driver_domain(&y), Some("sync"));
}

#[test]
fn case_outside_switch() {
    let mut m = Module::new();
    let err = m.case([0], |_| Ok(())).unwrap_err();
    assert_eq!(err.kind, BuildErrorKind::Scoping);
    assert_eq!(err.message, "Case is not permitted outside of Switch");

    let err = m.default(|_| Ok(())).unwrap_err();
    assert_eq!(err.message, "Default is not permitted outside of Switch");
}

#[test]
fn constructs_directly_inside_switch() {
    let s = sig("s", 2);
    let x = sig("x", 1);

    let mut m = Module::new();
    let err = m.switch(&s, |m| m.if_(&x, |_| Ok(()))).unwrap_err();
    assert_eq!(err.kind, BuildErrorKind::Scoping);
    assert_eq!(
        err.message,
        "If is not permitted directly inside of Switch; it is permitted inside of Switch Case"
    );

    let mut m = Module::new();
    let err = m.switch(&s, |m| m.comb(x.assign(1))).unwrap_err();
    assert_eq!(err.kind, BuildErrorKind::Scoping);
}

#[test]
fn nested_switch_inside_case() {
    let s = sig("s", 1);
    let t = sig("t", 1);
    let x = sig("x", 1);

    let mut m = Module::new();
    m.switch(&s, |m| {
        m.case([1], |m| m.switch(&t, |m| m.case([0], |m| m.comb(x.assign(1)))))?;
        m.default(|m| m.comb(x.assign(0)))
    })
    .unwrap();
    let fragment = m.elaborate(None).unwrap();

    let expected = "\
switch (sig s)
  case 1
    switch (sig t)
      case 0
        (eq (sig x) (const 1'd1))
  default
    (eq (sig x) (const 1'd0))
";
    assert_eq!(render_domain(&fragment, "comb"), expected);
}

#[test]
fn failed_case_leaves_switch_open() {
    let s = sig("s", 1);
    let b = sig("b", 1);
    let x = sig("x", 1);

    let mut m = Module::new();
    m.switch(&s, |m| {
        let err = m
            .case(["0"], |m| {
                m.if_(&b, |m| m.comb(x.assign(0)))?;
                m.case(["0"], |_| Ok(()))
            })
            .unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::Scoping);
        m.case(["1"], |m| m.comb(x.assign(1)))
    })
    .unwrap();
    let fragment = m.elaborate(None).unwrap();

    let expected = "\
switch (sig s)
  case 1
    (eq (sig x) (const 1'd1))
";
    assert_eq!(render_domain(&fragment, "comb"), expected);
}

#[test]
fn failed_switch_is_discarded() {
    let s = sig("s", 1);
    let x = sig("x", 1);
    let y = sig("y", 1);

    let mut m = Module::new();
    m.sync(x.assign(0)).unwrap();
    let err = m
        .switch(&s, |m| {
            m.case([0], |m| m.comb(y.assign(1)))?;
            m.case([1], |m| m.comb(x.assign(1)))
        })
        .unwrap_err();
    assert_eq!(err.kind, BuildErrorKind::DriverConflict);

    m.comb(y.assign(0)).unwrap();
    let fragment = m.elaborate(None).unwrap();
    assert_eq!(render_domain(&fragment, "comb"), "(eq (sig y) (const 1'd0))\n");
}

#[test]
fn whitespace_variants_are_the_same_case() {
    let s = sig("s", 2);
    let x = sig("x", 2);

    let mut m = Module::new();
    m.switch(&s, |m| {
        m.case(["0 1"], |m| m.comb(x.assign(1)))?;
        m.case(["01"], |m| m.comb(x.assign(2)))
    })
    .unwrap();
    let fragment = m.elaborate(None).unwrap();

    let expected = "\
switch (sig s)
  case 01
    (eq (sig x) (const 1'd1))
";
    assert_eq!(render_domain(&fragment, "comb"), expected);
}
