use sheetmerge::logging::{LogConfig, LogFormat};
use sheetmerge::{Engine, FilterCondition, LogicOperator, OperationContext, RecordSet, Row};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Debug level shows validation failures as well as completions
    let _guard = LogConfig::debug().with_format(LogFormat::Compact).init()?;

    println!("=== SheetMerge Logging Demo ===\n");

    let engine = Engine::new();
    let set = RecordSet::new(
        vec!["amt".into(), "note".into()],
        vec![
            Row::from_iter(["150", "rush"]),
            Row::from_iter(["abc", ""]),
            Row::from_iter(["42", "   "]),
        ],
    )?;

    println!("1. Filtering (logs an info event with row counts)...");
    engine.filter(
        &mut OperationContext::new(),
        &set,
        &[FilterCondition::new("amt", "greaterThan", "100")],
        LogicOperator::And,
    )?;

    println!("\n2. Unknown condition name (logs a warning, matches every row)...");
    engine.filter(
        &mut OperationContext::new(),
        &set,
        &[FilterCondition::new("note", "isBlank", "")],
        LogicOperator::And,
    )?;

    println!("\n3. Sorting by a missing column (logs a debug event)...");
    let err = engine
        .sort_and_page(
            &mut OperationContext::new(),
            &set,
            Some("price"),
            Default::default(),
            None,
            None,
        )
        .unwrap_err();
    println!("   rejected: {err}");

    println!("\n=== Demo Complete ===");
    println!("Check the logs above to see tracing output!");

    Ok(())
}
