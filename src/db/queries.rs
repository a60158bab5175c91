pub const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
  id           INTEGER PRIMARY KEY AUTOINCREMENT,
  username     TEXT NOT NULL UNIQUE,
  display_name TEXT NOT NULL,
  avatar_url   TEXT,
  created_at   INTEGER NOT NULL
);
"#;

pub const CREATE_HABITS: &str = r#"
CREATE TABLE IF NOT EXISTS habits (
  id         INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id    INTEGER NOT NULL REFERENCES users(id),
  name       TEXT NOT NULL,
  emoji      TEXT,
  color      TEXT,
  category   TEXT,
  kind       TEXT,
  unit       TEXT,
  created_at INTEGER NOT NULL
);
"#;

pub const CREATE_LOGS: &str = r#"
CREATE TABLE IF NOT EXISTS logs (
  id          INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id     INTEGER NOT NULL REFERENCES users(id),
  habit_id    INTEGER NOT NULL REFERENCES habits(id),
  recorded_at TEXT NOT NULL,
  value       TEXT
);
"#;

pub const CREATE_CHALLENGES: &str = r#"
CREATE TABLE IF NOT EXISTS challenges (
  id          INTEGER PRIMARY KEY AUTOINCREMENT,
  title       TEXT NOT NULL,
  kind        TEXT NOT NULL DEFAULT 'personal',
  owner_id    INTEGER NOT NULL REFERENCES users(id),
  opponent_id INTEGER REFERENCES users(id),
  end_date    TEXT,
  archived    INTEGER NOT NULL DEFAULT 0,
  created_at  INTEGER NOT NULL
);
"#;

pub const INDEX_HABITS_USER: &str =
    "CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id);";

pub const INDEX_LOGS_USER_HABIT: &str =
    "CREATE INDEX IF NOT EXISTS idx_logs_user_habit ON logs(user_id, habit_id);";

pub const INDEX_LOGS_RECORDED_AT: &str =
    "CREATE INDEX IF NOT EXISTS idx_logs_recorded_at ON logs(recorded_at);";

pub const INDEX_CHALLENGES_OWNER: &str =
    "CREATE INDEX IF NOT EXISTS idx_challenges_owner ON challenges(owner_id);";

pub const INDEX_CHALLENGES_OPPONENT: &str =
    "CREATE INDEX IF NOT EXISTS idx_challenges_opponent ON challenges(opponent_id);";

pub fn schema_statements() -> Vec<&'static str> {
    vec![
        CREATE_USERS,
        CREATE_HABITS,
        CREATE_LOGS,
        CREATE_CHALLENGES,
        INDEX_HABITS_USER,
        INDEX_LOGS_USER_HABIT,
        INDEX_LOGS_RECORDED_AT,
        INDEX_CHALLENGES_OWNER,
        INDEX_CHALLENGES_OPPONENT,
    ]
}
