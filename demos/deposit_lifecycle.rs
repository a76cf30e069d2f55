//! Security deposit lifecycle example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use deposit_core::utils::MemoryDepositRepository;
use deposit_core::{
    AddDeductionRequest, DeductionCategory, DepositError, DepositManager, DepositPolicy,
    NewDeposit, ProcessRefundRequest, RefundMethod,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deposit_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("🏠 Deposit Core - Security Deposit Lifecycle Example\n");

    let policy = DepositPolicy::load()?;
    let mut manager = DepositManager::with_policy(MemoryDepositRepository::new(), policy);

    // 1. Record the deposit when the lease is signed
    println!("📝 Recording deposit...");
    let deposit = manager
        .create_deposit(NewDeposit::unpaid(
            "lease-2024-017".to_string(),
            "tenant-042".to_string(),
            "property-12b".to_string(),
            BigDecimal::from(1800),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ))
        .await?;
    println!("  ✓ Deposit {} for {} ({})", deposit.id, deposit.amount, deposit.status);

    let deposit = manager.mark_held(&deposit.id).await?;
    println!("  ✓ Payment received, status is now {}\n", deposit.status);

    // 2. Move-out inspection
    println!("🔍 Recording deductions...");
    let charges = [
        (350, "Patch and paint living room wall", DeductionCategory::Damage),
        (120, "Professional carpet cleaning", DeductionCategory::Cleaning),
    ];
    for (amount, description, category) in charges {
        let outcome = manager
            .add_deduction(
                &deposit.id,
                AddDeductionRequest::new(BigDecimal::from(amount), description.to_string(), category),
            )
            .await?;
        println!(
            "  ✓ {}: {} (remaining {})",
            outcome.deduction.category,
            outcome.deduction.amount,
            outcome.deposit.remaining_balance()
        );
        for warning in &outcome.warnings {
            println!("    ⚠ {}", warning);
        }
    }

    // An overdrawn deduction is rejected and nothing changes
    match manager
        .add_deduction(
            &deposit.id,
            AddDeductionRequest::new(
                BigDecimal::from(5000),
                "Full kitchen replacement".to_string(),
                DeductionCategory::Damage,
            ),
        )
        .await
    {
        Err(e @ DepositError::ExceedsRemainingBalance { .. }) => {
            println!("  ✗ Rejected [{}]: {}", e.error_code(), e)
        }
        other => println!("  ? Unexpected result: {:?}", other.map(|o| o.deduction.id)),
    }
    println!();

    // 3. Settle the deposit
    println!("💸 Processing refund...");
    let preview = manager.preview_refund(&deposit.id).await?;
    println!(
        "  Deposit {} - deductions {} + interest {} = refund {} ({})",
        preview.deposit_amount,
        preview.total_deductions,
        preview.interest_accrued,
        preview.refund_amount,
        preview.resulting_status
    );

    let outcome = manager
        .process_refund(
            &deposit.id,
            ProcessRefundRequest::new(chrono::Utc::now().date_naive(), RefundMethod::Check)
                .notes("Mailed to forwarding address".to_string()),
        )
        .await?;
    println!(
        "  ✓ Refunded {} by {}, deposit is {}\n",
        outcome.settlement.refund_amount, outcome.settlement.refund_method, outcome.deposit.status
    );

    // 4. Portfolio totals
    let summary = manager.summarize(None).await?;
    println!("📊 Summary");
    println!("  Deposits:         {}", summary.deposit_count);
    println!("  Currently held:   {}", summary.total_held);
    println!("  Total deductions: {}", summary.total_deductions);
    println!("  Total refunded:   {}", summary.total_refunded);

    Ok(())
}
