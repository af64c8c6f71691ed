use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use plan_engine::engines::fsae::blueprint::standard_savings_config;
use plan_engine::engines::fsae::{Costs, SavingsEstimateRequest, SavingsEstimator};
use plan_engine::engines::mpce::domain::HealthStatusId;
use plan_engine::engines::mpce::household::{Household, Utilization};
use plan_engine::engines::mpce::{CalculationOutcome, CalculationRequest, PlanCostEngine};
use plan_engine::error::AppError;

use crate::infra::load_prepared_catalog;

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// Rating region to quote
    #[arg(long, default_value = "CA")]
    pub(crate) region: String,
    /// Employment status
    #[arg(long, default_value = "fullTime")]
    pub(crate) status: String,
    /// Include a covered spouse
    #[arg(long)]
    pub(crate) spouse: bool,
    /// Number of covered children
    #[arg(long, default_value_t = 0)]
    pub(crate) children: u8,
    /// Utilization preset applied to every household member
    #[arg(long, default_value = "moderate")]
    pub(crate) health_status: String,
    /// Compare against a benefits catalog loaded from this JSON file
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Rating region to quote
    #[arg(long, default_value = "CA")]
    pub(crate) region: String,
    /// Employment status
    #[arg(long, default_value = "fullTime")]
    pub(crate) status: String,
    /// Primary annual income used for the savings estimate
    #[arg(long, default_value_t = 60_000.0)]
    pub(crate) income: f64,
    /// Skip the savings-account portion of the demo
    #[arg(long)]
    pub(crate) skip_savings: bool,
}

pub(crate) fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let CompareArgs {
        region,
        status,
        spouse,
        children,
        health_status,
        catalog,
    } = args;

    let prepared = load_prepared_catalog(catalog.as_deref())?;
    let preset_id = HealthStatusId::from(health_status.as_str());
    let Some(preset) = prepared.catalog().health_statuses.get(&preset_id) else {
        println!("Unknown health status '{health_status}'. Configured presets:");
        for id in &prepared.catalog().health_statuses_order {
            let preset = &prepared.catalog().health_statuses[id];
            println!("  - {} ({})", id, preset.description.resolve());
        }
        return Ok(());
    };
    let member: Utilization = preset.contents.clone();

    let household = Household {
        primary: member.clone(),
        spouse: spouse.then(|| member.clone()),
        children: vec![member; usize::from(children)],
    };

    let engine = PlanCostEngine::new(Arc::new(prepared));
    let outcome = engine.calculate(&CalculationRequest {
        region_id: region.as_str().into(),
        status_id: status.as_str().into(),
        household,
        plan_inputs: BTreeMap::new(),
    })?;

    println!(
        "Plan comparison for region {region}, status {status}, preset {health_status} \
         (spouse: {}, children: {children})",
        if spouse { "yes" } else { "no" }
    );
    render_comparison(&outcome);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        region,
        status,
        income,
        skip_savings,
    } = args;

    println!("=================================================");
    println!("              Plan Cost Advisor Demo");
    println!("=================================================");
    println!();

    let prepared = load_prepared_catalog(None)?;
    let catalog = prepared.catalog();

    println!("--- 1. Benefits Catalog ---");
    for region_id in &catalog.regions_order {
        let region = &catalog.regions[region_id];
        let plans: Vec<&str> = region
            .plans
            .iter()
            .map(|plan_id| catalog.plans[plan_id].description.resolve())
            .collect();
        println!(
            "Region {} ({}): {}",
            region_id,
            region.description.resolve(),
            plans.join(", ")
        );
    }
    println!(
        "Coverage tiers: {}",
        catalog
            .coverage_levels_order
            .iter()
            .map(|id| catalog.coverage_levels[id].description.resolve())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();

    println!("--- 2. Year-End Cost Comparison ---");
    println!("A family of four with moderate utilization, quoted in {region}.");
    println!();

    let preset = &catalog.health_statuses[&HealthStatusId::from("moderate")];
    let member = preset.contents.clone();
    let household = Household {
        primary: member.clone(),
        spouse: Some(member.clone()),
        children: vec![member.clone(), member],
    };

    let engine = PlanCostEngine::new(Arc::new(prepared));
    let outcome = engine.calculate(&CalculationRequest {
        region_id: region.as_str().into(),
        status_id: status.as_str().into(),
        household,
        plan_inputs: BTreeMap::new(),
    })?;
    render_comparison(&outcome);

    if skip_savings {
        println!();
        println!("--- Demo Complete ---");
        println!("Skipped the savings estimate as requested.");
        return Ok(());
    }

    println!();
    println!("--- 3. Pre-Tax Savings Estimate ---");

    let Some(cheapest) = outcome
        .results
        .iter()
        .min_by(|a, b| a.total_annual_cost.total_cmp(&b.total_annual_cost))
    else {
        println!("No plans are configured for region {region}; skipping the savings estimate.");
        return Ok(());
    };
    println!(
        "Funding the member costs of the cheapest plan ({}) through a \
         pre-tax account at an income of {income:.0}:",
        cheapest.description
    );

    let estimator = SavingsEstimator::new(Arc::new(standard_savings_config()))?;
    let estimate = estimator.calculate(&SavingsEstimateRequest {
        account_type_id: String::new(),
        filing_status_id: "marriedFilingJoint".to_string(),
        number_of_dependents: 2,
        primary_annual_income: income,
        spouse_annual_income: 0.0,
        rollover_amount: 0.0,
        costs: Costs::One(cheapest.total_medical_and_drug_costs_less_fund_offset),
    })?;

    println!(
        "- Suggested contribution: {:.2} ({})",
        estimate.suggested_contribution, estimate.account_type_description
    );
    println!(
        "- Employer match: {:.2}",
        estimate.employer_matching_contribution
    );
    println!(
        "- Federal income tax savings: {:.2}",
        estimate.federal_income_tax_savings
    );
    println!("- FICA savings: {:.2}", estimate.fica_tax_savings);
    println!(
        "- Total savings including match: {:.2}",
        estimate.total_match_and_tax_savings
    );

    println!();
    println!("--- Demo Complete ---");

    Ok(())
}

fn render_comparison(outcome: &CalculationOutcome) {
    println!("Coverage level: {}", outcome.coverage_level_id);
    println!();
    println!(
        "{:<32} {:>10} {:>12} {:>10} {:>12}",
        "Plan", "Premium", "Member care", "Fund", "Annual total"
    );
    for result in &outcome.results {
        println!(
            "{:<32} {:>10.2} {:>12.2} {:>10.2} {:>12.2}",
            result.description,
            result.total_annual_payroll_contributions,
            result.total_medical_and_drug_costs,
            result.total_fund_amount_offset,
            result.total_annual_cost
        );
    }

    let best = outcome
        .results
        .iter()
        .min_by(|a, b| a.total_annual_cost.total_cmp(&b.total_annual_cost));
    if let Some(best) = best {
        println!();
        println!(
            "Lowest annual total: {} at {:.2}",
            best.description, best.total_annual_cost
        );
    }
}
