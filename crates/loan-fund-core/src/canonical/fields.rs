//! Candidate locations for every canonical fact, highest priority first.
//!
//! This table is the single place that decides which producer spelling wins
//! when several are present. Block-relative paths (waterfall, Monte Carlo,
//! loans, zones) are resolved against the block, not the payload root.

use crate::resolver::FieldPath;

// ---------------------------------------------------------------------------
// Run envelope
// ---------------------------------------------------------------------------

pub const RUN_ID: FieldPath = FieldPath::new(
    "run_id",
    &["run_id", "runId", "simulation_id", "simulationId", "id"],
);
pub const STATUS: FieldPath = FieldPath::new("status", &["status", "state", "results.status"]);
pub const PROGRESS: FieldPath = FieldPath::new(
    "progress",
    &["progress", "progress_pct", "progressPct", "results.progress"],
);
pub const COMPLETED_AT: FieldPath = FieldPath::new(
    "completed_at",
    &["completed_at", "completedAt", "finished_at", "finishedAt"],
);

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

pub const GROSS_IRR: FieldPath = FieldPath::new(
    "metrics.gross_irr",
    &[
        "metrics.gross_irr",
        "metrics.grossIrr",
        "metrics.grossIRR",
        "gross_irr",
        "grossIrr",
        "results.gross_irr",
        "waterfall.gross_irr",
        "waterfall_results.gross_irr",
    ],
);
pub const FUND_IRR: FieldPath = FieldPath::new(
    "metrics.fund_irr",
    &[
        "metrics.fund_irr",
        "metrics.fundIrr",
        "metrics.fundIRR",
        "metrics.net_irr",
        "metrics.netIrr",
        "metrics.irr",
        "fund_irr",
        "fundIrr",
        "net_irr",
        "irr",
        "results.irr",
    ],
);
pub const LP_IRR: FieldPath = FieldPath::new(
    "metrics.lp_irr",
    &[
        "metrics.lp_irr",
        "metrics.lpIrr",
        "metrics.lpIRR",
        "metrics.lp_net_irr",
        "lp_irr",
        "lpIrr",
        "waterfall.lp_irr",
        "waterfall_results.lp_irr",
    ],
);
pub const GROSS_MULTIPLE: FieldPath = FieldPath::new(
    "metrics.gross_multiple",
    &[
        "metrics.gross_multiple",
        "metrics.grossMultiple",
        "metrics.gross_moic",
        "gross_multiple",
        "grossMultiple",
        "waterfall.gross_multiple",
    ],
);
pub const FUND_MULTIPLE: FieldPath = FieldPath::new(
    "metrics.fund_multiple",
    &[
        "metrics.fund_multiple",
        "metrics.fundMultiple",
        "metrics.net_multiple",
        "metrics.multiple",
        "metrics.moic",
        "fund_multiple",
        "net_multiple",
        "multiple",
        "moic",
    ],
);
pub const LP_MULTIPLE: FieldPath = FieldPath::new(
    "metrics.lp_multiple",
    &[
        "metrics.lp_multiple",
        "metrics.lpMultiple",
        "metrics.lp_net_multiple",
        "lp_multiple",
        "lpMultiple",
        "waterfall.lp_multiple",
    ],
);
pub const DPI: FieldPath = FieldPath::new("metrics.dpi", &["metrics.dpi", "metrics.DPI", "dpi", "results.dpi"]);
pub const RVPI: FieldPath = FieldPath::new(
    "metrics.rvpi",
    &["metrics.rvpi", "metrics.RVPI", "rvpi", "results.rvpi"],
);
pub const TVPI: FieldPath = FieldPath::new(
    "metrics.tvpi",
    &["metrics.tvpi", "metrics.TVPI", "tvpi", "results.tvpi"],
);
pub const TOTAL_CAPITAL_CALLED: FieldPath = FieldPath::new(
    "metrics.total_capital_called",
    &[
        "metrics.total_capital_called",
        "metrics.totalCapitalCalled",
        "metrics.capital_called",
        "metrics.paid_in_capital",
        "total_capital_called",
        "totalCapitalCalled",
    ],
);
pub const TOTAL_DISTRIBUTIONS: FieldPath = FieldPath::new(
    "metrics.total_distributions",
    &[
        "metrics.total_distributions",
        "metrics.totalDistributions",
        "metrics.distributions",
        "total_distributions",
        "totalDistributions",
    ],
);
pub const NET_CASH_FLOW: FieldPath = FieldPath::new(
    "metrics.net_cash_flow",
    &[
        "metrics.net_cash_flow",
        "metrics.netCashFlow",
        "net_cash_flow",
        "netCashFlow",
    ],
);
pub const MANAGEMENT_FEES: FieldPath = FieldPath::new(
    "metrics.total_management_fees",
    &[
        "metrics.total_management_fees",
        "metrics.management_fees",
        "metrics.managementFees",
        "total_management_fees",
        "management_fees",
        "waterfall.management_fees",
        "waterfall_results.management_fees",
        "fees.management",
    ],
);
pub const CARRIED_INTEREST: FieldPath = FieldPath::new(
    "metrics.total_carried_interest",
    &[
        "metrics.total_carried_interest",
        "metrics.carried_interest",
        "metrics.carriedInterest",
        "waterfall.gp_carried_interest",
        "waterfall.carried_interest",
        "waterfall_results.carried_interest",
        "carried_interest",
        "fees.carry",
    ],
);
pub const YEARS_ELAPSED: FieldPath = FieldPath::new(
    "metrics.years_elapsed",
    &[
        "metrics.years_elapsed",
        "metrics.yearsElapsed",
        "metrics.elapsed_years",
        "years_elapsed",
        "current_year",
        "currentYear",
    ],
);

// ---------------------------------------------------------------------------
// Portfolio snapshot
// ---------------------------------------------------------------------------

pub const TOTAL_LOANS: FieldPath = FieldPath::new(
    "portfolio.total_loans",
    &[
        "portfolio.total_loans",
        "portfolio.totalLoans",
        "portfolio.loan_count",
        "portfolio.num_loans",
        "metrics.total_loans",
        "total_loans",
        "num_loans",
    ],
);
pub const ACTIVE_LOANS: FieldPath = FieldPath::new(
    "portfolio.active_loans",
    &[
        "portfolio.active_loans",
        "portfolio.activeLoans",
        "metrics.active_loans",
        "active_loans",
    ],
);
pub const EXITED_LOANS: FieldPath = FieldPath::new(
    "portfolio.exited_loans",
    &[
        "portfolio.exited_loans",
        "portfolio.exitedLoans",
        "metrics.exited_loans",
        "exited_loans",
    ],
);
pub const DEFAULTED_LOANS: FieldPath = FieldPath::new(
    "portfolio.defaulted_loans",
    &[
        "portfolio.defaulted_loans",
        "portfolio.defaultedLoans",
        "portfolio.defaults",
        "metrics.defaulted_loans",
        "defaulted_loans",
    ],
);
pub const REINVESTED_LOANS: FieldPath = FieldPath::new(
    "portfolio.reinvested_loans",
    &[
        "portfolio.reinvested_loans",
        "portfolio.reinvestedLoans",
        "portfolio.reinvestment_count",
        "metrics.reinvested_loans",
        "reinvested_loans",
    ],
);
pub const TOTAL_LOAN_AMOUNT: FieldPath = FieldPath::new(
    "portfolio.total_loan_amount",
    &[
        "portfolio.total_loan_amount",
        "portfolio.totalLoanAmount",
        "portfolio.total_amount",
        "metrics.total_loan_amount",
        "total_loan_amount",
    ],
);
pub const AVERAGE_LOAN_SIZE: FieldPath = FieldPath::new(
    "portfolio.average_loan_size",
    &[
        "portfolio.average_loan_size",
        "portfolio.avg_loan_size",
        "portfolio.averageLoanSize",
        "metrics.average_loan_size",
        "average_loan_size",
    ],
);
pub const AVERAGE_LTV: FieldPath = FieldPath::new(
    "portfolio.average_ltv",
    &[
        "portfolio.average_ltv",
        "portfolio.avg_ltv",
        "portfolio.averageLtv",
        "metrics.avg_ltv",
        "metrics.average_ltv",
        "avg_ltv",
    ],
);
pub const DEFAULT_RATE: FieldPath = FieldPath::new(
    "portfolio.default_rate",
    &[
        "portfolio.default_rate",
        "portfolio.defaultRate",
        "metrics.default_rate",
        "metrics.defaultRate",
        "default_rate",
    ],
);
pub const ZONE_DISTRIBUTION: FieldPath = FieldPath::new(
    "portfolio.zone_distribution",
    &[
        "portfolio.zone_distribution",
        "portfolio.zoneDistribution",
        "portfolio.zone_allocation",
        "portfolio.zones",
        "metrics.zone_distribution",
        "zone_distribution",
        "zoneDistribution",
    ],
);
pub const ZONE_IRR: FieldPath = FieldPath::new(
    "portfolio.zone_irr",
    &[
        "portfolio.zone_irr",
        "portfolio.zoneIrr",
        "metrics.zone_irr",
        "metrics.irr_by_zone",
        "zone_irr",
        "zoneIrr",
        "irr_by_zone",
    ],
);
pub const LOANS: FieldPath = FieldPath::new(
    "portfolio.loans",
    &[
        "portfolio.loans",
        "portfolio.loan_list",
        "loans",
        "results.loans",
        "loan_list",
    ],
);

/// Per-zone value inside a zone object when it is itself a record.
pub const ZONE_SHARE: FieldPath = FieldPath::new(
    "zone.share",
    &["share", "percentage", "pct", "allocation", "fraction", "count", "loans"],
);

/// Per-zone IRR inside a zone object.
pub const ZONE_IRR_VALUE: FieldPath = FieldPath::new(
    "zone.irr",
    &["irr", "avg_irr", "average_irr", "mean_irr", "value"],
);

// ---------------------------------------------------------------------------
// Loan records (relative to one loan)
// ---------------------------------------------------------------------------

pub const LOAN_ID: FieldPath = FieldPath::new("loan.loan_id", &["loan_id", "loanId", "id", "loan_number"]);
pub const LOAN_ZONE: FieldPath = FieldPath::new("loan.zone", &["zone", "risk_zone", "riskZone", "zone_name"]);
pub const LOAN_AMOUNT: FieldPath = FieldPath::new(
    "loan.loan_amount",
    &["loan_amount", "loanAmount", "amount", "principal", "loan_size"],
);
pub const LOAN_IRR: FieldPath = FieldPath::new(
    "loan.irr",
    &["irr", "loan_irr", "loanIrr", "realized_irr", "expected_irr"],
);
pub const LOAN_LTV: FieldPath = FieldPath::new("loan.ltv", &["ltv", "loan_to_value", "ltv_ratio"]);
pub const LOAN_ORIGINATION_YEAR: FieldPath = FieldPath::new(
    "loan.origination_year",
    &["origination_year", "originationYear", "start_year", "year"],
);
pub const LOAN_EXIT_YEAR: FieldPath = FieldPath::new(
    "loan.exit_year",
    &["exit_year", "exitYear", "exit_period", "year_exited"],
);
pub const LOAN_REINVESTMENT: FieldPath = FieldPath::new(
    "loan.is_reinvestment",
    &["is_reinvestment", "isReinvestment", "reinvested", "reinvestment"],
);
pub const LOAN_DEFAULTED: FieldPath = FieldPath::new(
    "loan.defaulted",
    &["defaulted", "is_defaulted", "isDefaulted", "default"],
);
pub const LOAN_STATUS: FieldPath = FieldPath::new("loan.status", &["status", "state"]);

// ---------------------------------------------------------------------------
// Waterfall block
// ---------------------------------------------------------------------------

pub const WATERFALL: FieldPath = FieldPath::new(
    "waterfall",
    &[
        "waterfall",
        "waterfall_results",
        "waterfallResults",
        "waterfall_result",
        "results.waterfall",
    ],
);
pub const WF_TOTAL_DISTRIBUTIONS: FieldPath = FieldPath::new(
    "waterfall.total_distributions",
    &["total_distributions", "totalDistributions", "total"],
);
pub const WF_LP_DISTRIBUTIONS: FieldPath = FieldPath::new(
    "waterfall.lp_distributions",
    &["lp_distributions", "lpDistributions", "total_lp", "lp_total", "to_lp"],
);
pub const WF_GP_DISTRIBUTIONS: FieldPath = FieldPath::new(
    "waterfall.gp_distributions",
    &["gp_distributions", "gpDistributions", "total_gp", "gp_total", "to_gp"],
);
pub const WF_RETURN_OF_CAPITAL: FieldPath = FieldPath::new(
    "waterfall.return_of_capital",
    &["return_of_capital", "returnOfCapital", "capital_returned"],
);
pub const WF_PREFERRED_RETURN: FieldPath = FieldPath::new(
    "waterfall.preferred_return",
    &["preferred_return", "preferredReturn", "pref_return"],
);
pub const WF_GP_CATCH_UP: FieldPath = FieldPath::new(
    "waterfall.gp_catch_up",
    &["gp_catch_up", "gpCatchUp", "catch_up", "catchup"],
);
pub const WF_GP_CARRIED_INTEREST: FieldPath = FieldPath::new(
    "waterfall.gp_carried_interest",
    &[
        "gp_carried_interest",
        "gpCarriedInterest",
        "carried_interest",
        "carriedInterest",
        "carry",
    ],
);
pub const WF_MANAGEMENT_FEES: FieldPath = FieldPath::new(
    "waterfall.management_fees",
    &["management_fees", "managementFees", "total_management_fees"],
);

// ---------------------------------------------------------------------------
// Monte Carlo block
// ---------------------------------------------------------------------------

pub const MONTE_CARLO: FieldPath = FieldPath::new(
    "monte_carlo",
    &[
        "monte_carlo",
        "monteCarlo",
        "monte_carlo_results",
        "monteCarloResults",
        "results.monte_carlo",
    ],
);
pub const MC_ITERATIONS: FieldPath = FieldPath::new(
    "monte_carlo.iterations",
    &["iterations", "num_simulations", "numSimulations", "simulations"],
);
pub const MC_IRR_DISTRIBUTION: FieldPath = FieldPath::new(
    "monte_carlo.irr_distribution",
    &[
        "irr_distribution",
        "irrDistribution",
        "distribution.irr",
        "distributions.irr",
        "irr",
    ],
);
pub const MC_MULTIPLE_DISTRIBUTION: FieldPath = FieldPath::new(
    "monte_carlo.multiple_distribution",
    &[
        "multiple_distribution",
        "multipleDistribution",
        "distribution.multiple",
        "distributions.multiple",
        "multiple",
        "moic",
    ],
);
pub const MC_SENSITIVITY: FieldPath = FieldPath::new(
    "monte_carlo.sensitivity",
    &["sensitivity", "sensitivity_analysis", "sensitivityAnalysis"],
);
pub const MC_CONFIDENCE: FieldPath = FieldPath::new(
    "monte_carlo.confidence_intervals",
    &["confidence_intervals", "confidenceIntervals", "confidence"],
);

pub const DIST_MEAN: FieldPath = FieldPath::new("mean", &["mean", "avg", "average"]);
pub const DIST_MEDIAN: FieldPath = FieldPath::new("median", &["median", "p50", "percentiles.p50", "percentiles.50"]);
pub const DIST_STD_DEV: FieldPath = FieldPath::new(
    "std_dev",
    &["std_dev", "stdDev", "std", "standard_deviation"],
);
pub const DIST_MIN: FieldPath = FieldPath::new("min", &["min", "minimum"]);
pub const DIST_MAX: FieldPath = FieldPath::new("max", &["max", "maximum"]);
pub const DIST_P5: FieldPath = FieldPath::new("p5", &["p5", "percentiles.p5", "percentiles.5", "percentile_5"]);
pub const DIST_P25: FieldPath = FieldPath::new("p25", &["p25", "percentiles.p25", "percentiles.25", "percentile_25"]);
pub const DIST_P75: FieldPath = FieldPath::new("p75", &["p75", "percentiles.p75", "percentiles.75", "percentile_75"]);
pub const DIST_P95: FieldPath = FieldPath::new("p95", &["p95", "percentiles.p95", "percentiles.95", "percentile_95"]);
pub const DIST_SAMPLES: FieldPath = FieldPath::new("samples", &["samples", "values", "raw"]);

pub const SENS_VARIABLE: FieldPath = FieldPath::new("variable", &["variable", "name", "parameter"]);
pub const SENS_BASE: FieldPath = FieldPath::new("base", &["base", "base_case", "baseline"]);
pub const SENS_LOW: FieldPath = FieldPath::new("low", &["low", "min", "downside"]);
pub const SENS_HIGH: FieldPath = FieldPath::new("high", &["high", "max", "upside"]);

pub const CI_LEVEL: FieldPath = FieldPath::new("level", &["level", "confidence", "pct"]);
pub const CI_LOWER: FieldPath = FieldPath::new("lower", &["lower", "low", "lower_bound", "0"]);
pub const CI_UPPER: FieldPath = FieldPath::new("upper", &["upper", "high", "upper_bound", "1"]);

// ---------------------------------------------------------------------------
// Config echo
// ---------------------------------------------------------------------------

pub const FUND_SIZE: FieldPath = FieldPath::new(
    "config.fund_size",
    &[
        "config.fund_size",
        "config.fundSize",
        "config.total_commitment",
        "fund_size",
        "fundSize",
    ],
);
pub const TARGET_IRR: FieldPath = FieldPath::new(
    "config.target_irr",
    &[
        "config.target_irr",
        "config.targetIrr",
        "config.targets.irr",
        "target_irr",
        "targetIrr",
    ],
);
pub const TARGET_MULTIPLE: FieldPath = FieldPath::new(
    "config.target_multiple",
    &[
        "config.target_multiple",
        "config.targetMultiple",
        "config.targets.multiple",
        "target_multiple",
        "targetMultiple",
    ],
);
pub const ZONE_TARGETS: FieldPath = FieldPath::new(
    "config.zone_targets",
    &[
        "config.zone_targets",
        "config.zoneTargets",
        "config.zone_allocations",
        "config.target_zone_allocation",
        "zone_targets",
    ],
);
pub const AVG_LOAN_LTV: FieldPath = FieldPath::new(
    "config.avg_loan_ltv",
    &[
        "config.avg_loan_ltv",
        "config.avgLoanLtv",
        "config.target_ltv",
        "config.average_ltv",
        "avg_loan_ltv",
    ],
);
pub const BASE_DEFAULT_RATE: FieldPath = FieldPath::new(
    "config.base_default_rate",
    &[
        "config.base_default_rate",
        "config.baseDefaultRate",
        "config.default_rate",
        "base_default_rate",
    ],
);
pub const HURDLE_RATE: FieldPath = FieldPath::new(
    "config.hurdle_rate",
    &[
        "config.hurdle_rate",
        "config.hurdleRate",
        "config.preferred_return",
        "config.waterfall.hurdle_rate",
        "hurdle_rate",
    ],
);
pub const CARRY_RATE: FieldPath = FieldPath::new(
    "config.carry_rate",
    &[
        "config.carry_rate",
        "config.carryRate",
        "config.carried_interest_pct",
        "config.carried_interest",
        "config.waterfall.carry_rate",
        "carry_rate",
    ],
);
pub const MANAGEMENT_FEE_RATE: FieldPath = FieldPath::new(
    "config.management_fee_rate",
    &[
        "config.management_fee_rate",
        "config.managementFeeRate",
        "config.management_fee",
        "config.mgmt_fee",
        "management_fee_rate",
    ],
);
pub const REINVESTMENT_PERIOD: FieldPath = FieldPath::new(
    "config.reinvestment_period_years",
    &[
        "config.reinvestment_period_years",
        "config.reinvestment_period",
        "config.reinvestmentPeriod",
        "reinvestment_period",
    ],
);
pub const INITIAL_LOAN_COUNT: FieldPath = FieldPath::new(
    "config.initial_loan_count",
    &[
        "config.initial_loan_count",
        "config.initialLoanCount",
        "config.num_loans",
        "config.number_of_loans",
        "config.loan_count",
    ],
);
pub const AVG_LOAN_SIZE: FieldPath = FieldPath::new(
    "config.avg_loan_size",
    &[
        "config.avg_loan_size",
        "config.average_loan_size",
        "config.avgLoanSize",
        "config.loan_size",
    ],
);
