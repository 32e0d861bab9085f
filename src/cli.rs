// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn pos(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).help(help)
}

fn date_range(cmd: Command) -> Command {
    cmd.arg(opt("from", "First day, YYYY-MM-DD"))
        .arg(opt("to", "Last day, YYYY-MM-DD"))
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Manage accounts")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Create an account with zero balance")
                .arg(pos("name", "Account name"))
                .arg(
                    Arg::new("reserve")
                        .long("reserve")
                        .action(ArgAction::SetTrue)
                        .help("Mark as a reserve (savings) account"),
                ),
        )
        .subcommand(json_args(
            Command::new("list")
                .about("List accounts with balances recomputed from transactions")
                .arg(
                    opt("kind", "Which accounts to show")
                        .value_parser(["all", "standard", "reserve"])
                        .default_value("all"),
                )
                .arg(opt("search", "Case-insensitive name filter")),
        ))
        .subcommand(
            Command::new("edit")
                .about("Rename an account or change its reserve flag")
                .arg(pos("account", "Account name or id"))
                .arg(opt("name", "New name"))
                .arg(opt("reserve", "Reserve flag").value_parser(value_parser!(bool))),
        )
        .subcommand(
            Command::new("default")
                .about("Use this account for quick-add expenses")
                .arg(pos("account", "Account name or id")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete an account whose balance is zero")
                .arg(pos("account", "Account name or id")),
        )
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(pos("name", "Category name"))
                .arg(req("type", "income or expense").value_parser(["income", "expense"])),
        )
        .subcommand(json_args(
            Command::new("list").arg(opt("type", "Only this type").value_parser(["income", "expense"])),
        ))
        .subcommand(
            Command::new("edit")
                .about("Rename (updating every reference) or retype a category")
                .arg(pos("category", "Current name"))
                .arg(opt("name", "New name"))
                .arg(opt("type", "New type").value_parser(["income", "expense"])),
        )
        .subcommand(Command::new("rm").arg(pos("category", "Category name")))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and manage transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("type", "income or expense").value_parser(["income", "expense"]))
                .arg(req("amount", "Amount, '.' or ',' as decimal separator"))
                .arg(req("category", "Category name"))
                .arg(req("account", "Account name or id"))
                .arg(opt("description", "Free text"))
                .arg(opt("date", "YYYY-MM-DD, defaults to now")),
        )
        .subcommand(
            Command::new("quick")
                .about("Record an expense: <amount> <category> [description]")
                .arg(
                    Arg::new("text")
                        .required(true)
                        .num_args(1..)
                        .help("Expense text"),
                ),
        )
        .subcommand(
            Command::new("transfer")
                .about("Move money between two accounts")
                .arg(req("from", "Source account"))
                .arg(req("to", "Destination account"))
                .arg(req("amount", "Amount"))
                .arg(opt("description", "Free text"))
                .arg(opt("date", "YYYY-MM-DD, defaults to now")),
        )
        .subcommand(
            Command::new("edit")
                .arg(pos("id", "Transaction id"))
                .arg(opt("amount", "New amount"))
                .arg(opt("category", "New category"))
                .arg(opt("description", "New description"))
                .arg(opt("date", "New date, YYYY-MM-DD")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete transactions and reverse their balance effect")
                .arg(
                    Arg::new("ids")
                        .required(true)
                        .num_args(1..)
                        .help("Transaction ids"),
                ),
        )
        .subcommand(json_args(date_range(
            Command::new("list")
                .arg(opt("account", "Account name or id"))
                .arg(opt("category", "Category name"))
                .arg(opt("type", "income or expense").value_parser(["income", "expense"]))
                .arg(opt("limit", "Maximum rows").value_parser(value_parser!(usize))),
        )))
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Monthly category budgets")
        .subcommand_required(true)
        .subcommand(
            Command::new("set")
                .arg(req("month", "YYYY-MM"))
                .arg(req("category", "Expense category"))
                .arg(req("amount", "Budget amount")),
        )
        .subcommand(
            Command::new("set-month")
                .about("Write budgets for every expense category at once (others become 0)")
                .arg(req("month", "YYYY-MM"))
                .arg(
                    Arg::new("entry")
                        .long("entry")
                        .action(ArgAction::Append)
                        .help("CATEGORY=AMOUNT, repeatable"),
                ),
        )
        .subcommand(json_args(Command::new("list").arg(opt("month", "YYYY-MM, defaults to current"))))
        .subcommand(json_args(
            Command::new("progress")
                .about("Spending against budgets")
                .arg(opt("month", "YYYY-MM, defaults to current")),
        ))
}

fn bill_cmd() -> Command {
    Command::new("bill")
        .about("Scheduled bills and installments")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("description", "What the bill is for"))
                .arg(req("amount", "Amount due"))
                .arg(req("category", "Expense category"))
                .arg(req("due", "Due date, YYYY-MM-DD"))
                .arg(
                    Arg::new("recurring")
                        .long("recurring")
                        .action(ArgAction::SetTrue)
                        .help("Schedule the next month once paid"),
                ),
        )
        .subcommand(
            Command::new("edit")
                .arg(pos("id", "Bill id"))
                .arg(opt("description", "New description"))
                .arg(opt("amount", "New amount"))
                .arg(opt("category", "New category"))
                .arg(opt("due", "New due date")),
        )
        .subcommand(Command::new("rm").arg(pos("id", "Bill id")))
        .subcommand(json_args(
            Command::new("list")
                .about("Pending bills, or every bill due in --month")
                .arg(opt("month", "YYYY-MM")),
        ))
        .subcommand(
            Command::new("pay")
                .arg(pos("id", "Bill id"))
                .arg(req("account", "Paying account")),
        )
}

fn goal_cmd() -> Command {
    Command::new("goal")
        .about("Savings goals")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(pos("name", "Goal name"))
                .arg(req("target", "Target amount"))
                .arg(opt("date", "Target date, YYYY-MM-DD")),
        )
        .subcommand(
            Command::new("edit")
                .arg(pos("goal", "Goal name or id"))
                .arg(opt("name", "New name"))
                .arg(opt("target", "New target"))
                .arg(opt("date", "New target date")),
        )
        .subcommand(Command::new("rm").arg(pos("goal", "Goal name or id")))
        .subcommand(json_args(Command::new("list")))
        .subcommand(
            Command::new("contribute")
                .arg(pos("goal", "Goal name or id"))
                .arg(req("amount", "Amount to move into the goal"))
                .arg(req("account", "Funding account")),
        )
        .subcommand(
            Command::new("complete")
                .about("Release the savings into an account and close the goal")
                .arg(pos("goal", "Goal name or id"))
                .arg(opt("account", "Existing destination account"))
                .arg(
                    Arg::new("new-account")
                        .long("new-account")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("account")
                        .help("Create an account named after the goal"),
                )
                .arg(
                    Arg::new("reserve")
                        .long("reserve")
                        .action(ArgAction::SetTrue)
                        .requires("new-account")
                        .help("Mark the new account as reserve"),
                ),
        )
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Reports over recorded transactions")
        .subcommand_required(true)
        .subcommand(json_args(Command::new("balances")))
        .subcommand(json_args(date_range(Command::new("summary"))))
        .subcommand(json_args(date_range(Command::new("monthly"))))
        .subcommand(json_args(date_range(Command::new("evolution"))))
        .subcommand(json_args(date_range(Command::new("categories"))))
        .subcommand(json_args(date_range(
            Command::new("ranking").arg(
                opt("top", "How many expenses")
                    .value_parser(value_parser!(usize))
                    .default_value("10"),
            ),
        )))
}

fn forecast_cmd() -> Command {
    Command::new("forecast")
        .about("Project next month's cash flow")
        .subcommand_required(true)
        .subcommand(json_args(
            Command::new("show")
                .arg(opt("month", "YYYY-MM, defaults to next month"))
                .arg(opt("as-of", "Reference day for averages, defaults to today"))
                .arg(
                    Arg::new("income")
                        .long("income")
                        .action(ArgAction::Append)
                        .help("DESCRIPTION=AMOUNT, repeatable"),
                )
                .arg(
                    Arg::new("expense")
                        .long("expense")
                        .action(ArgAction::Append)
                        .help("DESCRIPTION=AMOUNT, repeatable"),
                )
                .arg(
                    Arg::new("exclude")
                        .long("exclude")
                        .action(ArgAction::Append)
                        .help("Bill id to leave out, repeatable"),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .action(ArgAction::SetTrue)
                        .help("Store the forecast"),
                ),
        ))
        .subcommand(json_args(Command::new("list")))
}

pub fn build_cli() -> Command {
    Command::new("oikonomos")
        .about("Balance-consistent personal ledger")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("SQLite file (env OIKONOMOS_DB)"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .help("Ledger owner (env OIKONOMOS_USER)"),
        )
        .arg(
            Arg::new("currency-symbol")
                .long("currency-symbol")
                .global(true)
                .help("Symbol for formatted amounts (env OIKONOMOS_CURRENCY)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(account_cmd())
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(budget_cmd())
        .subcommand(bill_cmd())
        .subcommand(goal_cmd())
        .subcommand(report_cmd())
        .subcommand(forecast_cmd())
        .subcommand(
            Command::new("import")
                .about("Import data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(req("path", "CSV with date,type,amount,category,account,description")),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            req("format", "csv or json")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(req("out", "Output file")),
                ),
        )
        .subcommand(json_args(
            Command::new("doctor")
                .about("Compare stored balances with the transaction history")
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite drifted balances"),
                ),
        ))
}
