//! Candidate locations for period-level facts.

use crate::resolver::FieldPath;

pub const CASH_FLOWS: FieldPath = FieldPath::new(
    "cash_flows",
    &[
        "cash_flows",
        "cashFlows",
        "cashflows",
        "results.cash_flows",
        "results.cashFlows",
        "cash_flow_series",
        "cashFlowSeries",
    ],
);

pub const PORTFOLIO_EVOLUTION: FieldPath = FieldPath::new(
    "portfolio_evolution",
    &[
        "portfolio_evolution",
        "portfolioEvolution",
        "results.portfolio_evolution",
        "results.portfolioEvolution",
        "portfolio.evolution",
        "portfolio.yearly_evolution",
    ],
);

pub const FUND_TERM: FieldPath = FieldPath::new(
    "config.fund_term_years",
    &[
        "config.fund_term_years",
        "config.fund_term",
        "config.fundTerm",
        "config.fund_life",
        "config.fundLife",
        "fund_term_years",
        "fund_term",
        "fundTerm",
    ],
);

pub const YEARLY_INDEX: FieldPath = FieldPath::new(
    "period",
    &["period", "year", "month", "index", "period_index", "periodIndex"],
);

/// Monthly records often also carry their `year`; the month wins.
pub const MONTHLY_INDEX: FieldPath = FieldPath::new(
    "period",
    &[
        "month",
        "month_index",
        "monthIndex",
        "period",
        "index",
        "period_index",
        "periodIndex",
        "year",
    ],
);

pub const CAPITAL_CALLED: FieldPath = FieldPath::new(
    "capital_called",
    &[
        "capital_called",
        "capitalCalled",
        "capital_calls",
        "capitalCalls",
        "contributions",
        "calls",
    ],
);

pub const DISTRIBUTED: FieldPath = FieldPath::new(
    "distributed",
    &[
        "distributed",
        "distributions",
        "distribution",
        "lp_distributions",
        "total_distributions",
    ],
);

pub const NET: FieldPath = FieldPath::new(
    "net",
    &["net", "net_cash_flow", "netCashFlow", "net_cashflow"],
);

pub const ACTIVE_LOANS: FieldPath = FieldPath::new(
    "active_loans",
    &[
        "active_loans",
        "activeLoans",
        "active_loan_count",
        "loans_active",
        "active",
    ],
);

pub const EXITED_LOANS: FieldPath = FieldPath::new(
    "exited_loans",
    &["exited_loans", "exitedLoans", "loans_exited", "exits", "exited"],
);

pub const NEW_LOANS: FieldPath = FieldPath::new(
    "new_loans",
    &["new_loans", "newLoans", "loans_originated", "originations"],
);

pub const DEFAULTED_LOANS: FieldPath = FieldPath::new(
    "defaulted_loans",
    &[
        "defaulted_loans",
        "defaultedLoans",
        "loans_defaulted",
        "defaults",
        "defaulted",
    ],
);

pub const REINVESTMENTS: FieldPath = FieldPath::new(
    "reinvestments",
    &[
        "reinvestments",
        "reinvestment_count",
        "reinvested_loans",
        "reinvestedLoans",
        "new_reinvestment_loans",
    ],
);

pub const EXITED_ORIGINAL: FieldPath = FieldPath::new(
    "exited_original",
    &[
        "exited_original",
        "exitedOriginal",
        "exited_original_loans",
        "original_exits",
    ],
);

pub const EXITED_REINVESTED: FieldPath = FieldPath::new(
    "exited_reinvested",
    &[
        "exited_reinvested",
        "exitedReinvested",
        "exited_reinvested_loans",
        "reinvestment_exits",
    ],
);
