//! The fixed, ordered list of schema migrations for the budget database.

use super::{Migration, MissingDatabase, MigrationStep};

/// Baseline tables created by the desktop application on first launch.
pub const INITIAL_SCHEMA: Migration = Migration {
    name: "initial_schema",
    description: "Baseline budget tables",
    on_missing_database: MissingDatabase::Create,
    steps: &[
        MigrationStep::CreateTable {
            table: "categories",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                subcategory TEXT NOT NULL,
                UNIQUE(category, subcategory)
            ",
        },
        MigrationStep::CreateTable {
            table: "income",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                person TEXT NOT NULL,
                amount REAL NOT NULL,
                date DATE NOT NULL,
                description TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        MigrationStep::CreateTable {
            table: "expenses",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                person TEXT NOT NULL,
                amount REAL NOT NULL,
                date DATE NOT NULL,
                category TEXT NOT NULL,
                subcategory TEXT NOT NULL,
                description TEXT,
                payment_method TEXT,
                realized BOOLEAN DEFAULT 0,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        // Databases created before payment tracking
        MigrationStep::AddColumn {
            table: "expenses",
            column: "realized",
            definition: "BOOLEAN DEFAULT 0",
        },
        MigrationStep::CreateTable {
            table: "net_worth_assets",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                person TEXT NOT NULL,
                asset_type TEXT NOT NULL,
                asset_name TEXT NOT NULL,
                value REAL NOT NULL,
                date DATE NOT NULL,
                notes TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        MigrationStep::CreateTable {
            table: "savings_goals",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                goal_name TEXT NOT NULL UNIQUE,
                target_amount REAL NOT NULL,
                current_amount REAL DEFAULT 0,
                initial_amount REAL DEFAULT 0,
                target_date DATE,
                priority INTEGER DEFAULT 1,
                notes TEXT,
                is_completed BOOLEAN DEFAULT 0,
                completion_date DATE,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        MigrationStep::AddColumn {
            table: "savings_goals",
            column: "initial_amount",
            definition: "REAL DEFAULT 0",
        },
        MigrationStep::CreateTable {
            table: "savings_allocations",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                goal_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                date DATE NOT NULL,
                notes TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (goal_id) REFERENCES savings_goals (id)
            ",
        },
        MigrationStep::CreateTable {
            table: "budget_targets",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                subcategory TEXT,
                monthly_target REAL NOT NULL,
                year INTEGER NOT NULL,
                month INTEGER NOT NULL,
                UNIQUE(category, subcategory, year, month)
            ",
        },
        MigrationStep::CreateTable {
            table: "budget_estimates",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                subcategory TEXT NOT NULL,
                estimated_amount REAL NOT NULL,
                year INTEGER NOT NULL,
                month INTEGER NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(category, subcategory, year, month)
            ",
        },
        MigrationStep::CreateTable {
            table: "net_worth_snapshots",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date DATE NOT NULL UNIQUE,
                user_a_total REAL,
                user_b_total REAL,
                joint_total REAL,
                total_net_worth REAL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
    ],
};

/// Bank reconciliation, smart category suggestions and the status/default flags.
pub const FEATURE_ENHANCEMENTS: Migration = Migration {
    name: "feature_enhancements",
    description: "Bank reconciliation, category history, goal status and default estimates",
    on_missing_database: MissingDatabase::Create,
    steps: &[
        // UNIQUE row identity rejects re-imported statement lines
        MigrationStep::CreateTable {
            table: "bank_transactions",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date DATE NOT NULL,
                bank_rtn TEXT,
                account_number TEXT,
                transaction_type TEXT NOT NULL,
                description TEXT,
                debit REAL,
                credit REAL,
                check_number TEXT,
                account_balance REAL,
                reconciled BOOLEAN DEFAULT 0,
                imported_to_budget BOOLEAN DEFAULT 0,
                budget_entry_id INTEGER,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(date, description, debit, credit, account_balance)
            ",
        },
        MigrationStep::CreateTable {
            table: "expense_category_history",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description_pattern TEXT NOT NULL,
                category TEXT NOT NULL,
                subcategory TEXT NOT NULL,
                usage_count INTEGER DEFAULT 1,
                last_used TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(description_pattern, category, subcategory)
            ",
        },
        MigrationStep::AddColumn {
            table: "budget_estimates",
            column: "is_default",
            definition: "BOOLEAN DEFAULT 0",
        },
        MigrationStep::AddColumn {
            table: "savings_goals",
            column: "status",
            definition: "TEXT DEFAULT 'active'",
        },
        MigrationStep::AddColumn {
            table: "net_worth_assets",
            column: "category",
            definition: "TEXT",
        },
        MigrationStep::AddColumn {
            table: "bank_transactions",
            column: "comment",
            definition: "TEXT",
        },
        MigrationStep::AddColumn {
            table: "net_worth_assets",
            column: "last_updated",
            definition: "TIMESTAMP",
        },
    ],
};

/// Extended asset fields and the net worth history table.
pub const ASSET_DETAILS: Migration = Migration {
    name: "asset_details",
    description: "Asset subcategory and liquidity, net worth history",
    on_missing_database: MissingDatabase::Create,
    steps: &[
        MigrationStep::AddColumn {
            table: "net_worth_assets",
            column: "subcategory",
            definition: "TEXT",
        },
        MigrationStep::AddColumn {
            table: "net_worth_assets",
            column: "liquidity",
            definition: "INTEGER DEFAULT 5",
        },
        MigrationStep::CreateTable {
            table: "net_worth_history",
            definition: "
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                snapshot_date DATE NOT NULL,
                category TEXT,
                total_value REAL NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
    ],
};

/// Personal snapshot columns renamed to generic per-user names.
pub const GENERIC_USER_COLUMNS: Migration = Migration {
    name: "generic_user_columns",
    description: "Rename personal net worth snapshot columns to user_a/user_b",
    on_missing_database: MissingDatabase::Skip,
    steps: &[
        MigrationStep::RenameColumn {
            table: "net_worth_snapshots",
            from: "jeff_total",
            to: "user_a_total",
        },
        MigrationStep::RenameColumn {
            table: "net_worth_snapshots",
            from: "vanessa_total",
            to: "user_b_total",
        },
    ],
};

/// Every migration, in application order.
pub const ALL: &[Migration] = &[
    INITIAL_SCHEMA,
    FEATURE_ENHANCEMENTS,
    ASSET_DETAILS,
    GENERIC_USER_COLUMNS,
];

/// Look up a catalog migration by name
pub fn find(name: &str) -> Option<&'static Migration> {
    ALL.iter().find(|m| m.name == name)
}
