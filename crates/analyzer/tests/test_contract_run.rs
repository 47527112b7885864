//! A full run over one contract's worth of methods: clean, vulnerable,
//! unknown-target, and malformed functions together.

use anyhow::Result;
use ceiguard_analyzer::{
    AnalysisEngine, AnalyzerConfig, ClassificationTable, Confidence, ViolationKind,
};
use ceiguard_ir::{Function, RawOperation, RawStatement, SourceLocation, Statement};

fn call(target: &str, line: usize) -> RawStatement {
    Statement::Operation(RawOperation::new(target, SourceLocation::new(line, 5)))
}

fn write(slot: &str, line: usize) -> RawStatement {
    Statement::Operation(
        RawOperation::new("storage_store", SourceLocation::new(line, 5)).with_operand(slot),
    )
}

fn table() -> ClassificationTable {
    ClassificationTable::new()
        .with_effect("storage_store")
        .with_interaction("Token.transfer")
        .with_interaction("Oracle.price")
}

fn contract() -> Vec<Function> {
    vec![
        // CEI-correct: write first, call after.
        Function::new("redeem", vec![write("balances", 10), call("Token.transfer", 11)]),
        // Call first, write after: sequential violation.
        Function::new("withdraw", vec![call("Token.transfer", 20), write("balances", 21)]),
        // Per-recipient payout loop: call then write each iteration.
        Function::new(
            "distribute",
            vec![Statement::While {
                body: vec![call("Token.transfer", 31), write("paid", 32)],
            }],
        ),
        // Unlisted helper call: advisory only.
        Function::new("rebalance", vec![call("Library.sqrt", 40), write("pool", 41)]),
        // Break with no enclosing loop: malformed control flow.
        Function::new(
            "corrupted",
            vec![Statement::Break {
                location: SourceLocation::new(50, 5),
            }],
        ),
    ]
}

#[test]
fn full_contract_run_reports_each_shape_once() -> Result<()> {
    let report = AnalysisEngine::new(table()).run(&contract());

    // Findings sort by function name: distribute, then withdraw.
    let summary: Vec<_> = report
        .findings
        .iter()
        .map(|f| (f.function_name.as_str(), f.kind))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("distribute", ViolationKind::LoopCei),
            ("withdraw", ViolationKind::SequentialCei),
        ],
        "{}",
        report.to_json()?
    );

    assert_eq!(report.advisories.len(), 1);
    assert_eq!(report.advisories[0].function_name, "rebalance");
    assert_eq!(report.advisories[0].target_identifier, "Library.sqrt");

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].function_name(), "corrupted");

    Ok(())
}

#[test]
fn conditional_write_paths_obey_the_conservativeness_knob() {
    // The write only happens on one branch after the call.
    let guarded = Function::new(
        "sweep",
        vec![
            call("Oracle.price", 60),
            Statement::If {
                then_branch: vec![write("cache", 62)],
                else_branch: vec![],
            },
        ],
    );

    let conservative = AnalysisEngine::new(table()).run(std::slice::from_ref(&guarded));
    assert_eq!(conservative.findings.len(), 1);
    assert_eq!(conservative.findings[0].confidence, Confidence::Medium);

    let tolerant = AnalysisEngine::new(table())
        .with_config(AnalyzerConfig {
            flag_conditional_paths: false,
            ..AnalyzerConfig::default()
        })
        .run(std::slice::from_ref(&guarded));
    assert!(tolerant.findings.is_empty());
}

#[test]
fn unknown_targets_never_become_findings() {
    // Both operations unlisted: two advisories, nothing else.
    let function = Function::new(
        "opaque",
        vec![call("Mystery.ping", 70), call("Mystery.pong", 71)],
    );

    let report = AnalysisEngine::new(table()).run(&[function]);

    assert!(report.findings.is_empty());
    assert_eq!(report.advisories.len(), 2);
    assert!(report.errors.is_empty());
}
