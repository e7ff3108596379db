use serde_json::json;
use sheetmerge::{
    Engine, FilterCondition, JoinType, KeyColumnPair, LogicOperator, OperationContext, RecordSet,
    Row,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== SheetMerge Reference Join Demo ===\n");

    let engine = Engine::new();

    // Customer master list (reference) and an order export (primary)
    let customers = RecordSet::new(
        vec!["customer_id".into(), "region".into(), "status".into()],
        vec![
            Row::from_iter(["C-001", "East", "active"]),
            Row::from_iter(["C-002", "West", "retired"]),
            Row::from_iter(["C-003", "North", "active"]),
        ],
    )?;
    let orders = RecordSet::new(
        vec!["order".into(), "customer".into(), "amount".into()],
        vec![
            Row::from_iter(["1001", "c-001", "250.00"]),
            Row::from_iter(["1002", " C-002 ", "75.50"]),
            Row::from_iter(["1003", "C-003", "19.99"]),
            Row::from_iter(["1004", "C-404", "5.00"]),
        ],
    )?;

    println!("1. Inferring column types...");
    let types = engine.infer_types(&mut OperationContext::new(), &orders)?;
    for (column, ty) in types.column_types.iter() {
        println!("   {column}: {ty}");
    }

    println!("\n2. Joining orders to active customers (left join)...");
    let mut ctx = OperationContext::new();
    let joined = engine.reference_join(
        &mut ctx,
        &customers,
        &orders,
        &[KeyColumnPair::new("customer_id", "customer")],
        &[FilterCondition::new("status", "exactMatch", "active")],
        LogicOperator::And,
        JoinType::Left,
    )?;
    println!(
        "   request {}: {} rows, {} keys matched, {} orders without an active customer",
        ctx.request_id(),
        joined.total_rows,
        joined.matched_rows,
        joined.unmatched_primary_rows
    );
    println!("{}", serde_json::to_string_pretty(&joined.data)?);

    println!("\n3. Largest orders first, via the JSON boundary...");
    let page = engine.handle_json(
        &mut OperationContext::new(),
        json!({
            "operation": "sortAndPage",
            "data": serde_json::to_value(&joined.data)?,
            "sortColumn": "amount",
            "sortDirection": "desc",
            "pageSize": 2
        }),
    )?;
    println!("{}", serde_json::to_string_pretty(&page)?);

    println!("\n=== Demo Complete ===");
    Ok(())
}
