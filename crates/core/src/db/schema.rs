pub const SCHEMA: &str = "
-- Core prompts table
CREATE TABLE IF NOT EXISTS prompts (
    id TEXT PRIMARY KEY,                  -- UUID v4 string
    title TEXT NOT NULL,                  -- Display title (may be empty)
    text TEXT NOT NULL,                   -- The prompt body
    tags TEXT NOT NULL DEFAULT '[]',      -- JSON array of lowercase strings: [\"code\", \"debug\"]
    created_at INTEGER NOT NULL,          -- Unix timestamp (milliseconds)
    is_favorite INTEGER NOT NULL DEFAULT 0,
    use_count INTEGER NOT NULL DEFAULT 0, -- Increment on use
    last_copied_at INTEGER,               -- Unix timestamp (milliseconds)
    is_generating_details INTEGER NOT NULL DEFAULT 0,
    history TEXT NOT NULL DEFAULT '[]',   -- JSON array of {text, editedAt}, newest first
    custom_title INTEGER NOT NULL DEFAULT 0
);

-- Indexes for the common sort keys
CREATE INDEX IF NOT EXISTS idx_prompts_created ON prompts(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_prompts_usage ON prompts(use_count DESC);
";
