pub fn render_schema() -> String {
	"\
CREATE TABLE IF NOT EXISTS books (
	book_id UUID PRIMARY KEY,
	username TEXT,
	title TEXT NOT NULL,
	author TEXT,
	publish_year INT,
	work_key TEXT,
	cover_id BIGINT,
	cover_image BYTEA,
	cover_mime_type TEXT,
	review TEXT,
	rating INT,
	created_at TIMESTAMPTZ NOT NULL,
	updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_books_username ON books (username);
CREATE INDEX IF NOT EXISTS idx_books_work_key ON books (work_key);
CREATE TABLE IF NOT EXISTS recent_selections (
	selection_id UUID PRIMARY KEY,
	username TEXT NOT NULL,
	work_key TEXT NOT NULL,
	title TEXT NOT NULL,
	author TEXT,
	publish_year INT,
	cover_id BIGINT,
	cover_image BYTEA,
	cover_mime_type TEXT,
	created_at TIMESTAMPTZ NOT NULL,
	CONSTRAINT uq_recent_selections_scope_key UNIQUE (username, work_key)
);
CREATE INDEX IF NOT EXISTS idx_recent_selections_recency ON recent_selections (username, created_at DESC);
CREATE TABLE IF NOT EXISTS search_history (
	search_id UUID PRIMARY KEY,
	username TEXT,
	term TEXT NOT NULL,
	created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_search_history_recency ON search_history (username, created_at DESC)"
		.to_string()
}
