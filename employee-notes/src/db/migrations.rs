use lazy_static::lazy_static;
use rusqlite_migration::{Migrations, M};

lazy_static! {
    pub static ref MIGRATIONS: Migrations<'static> = Migrations::new(vec![
        M::up(
            r#"
            CREATE TABLE profiles (
                id TEXT PRIMARY KEY NOT NULL,
                admin_id INTEGER,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
        "#
        ),
        M::up(
            r#"
            CREATE TABLE notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                textrange TEXT, -- json array of offsets
                note_content TEXT NOT NULL,
                topic_id INTEGER,
                employee_id TEXT NOT NULL,
                is_public INTEGER NOT NULL DEFAULT 0,
                is_approved_cbh INTEGER NOT NULL DEFAULT 0,
                is_approved_emp INTEGER NOT NULL DEFAULT 0,

                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at TEXT
            );
        "#
        ),
        // display columns added after the first release, nullable for older rows
        M::up(
            r#"
            ALTER TABLE notes ADD COLUMN address TEXT;
            ALTER TABLE notes ADD COLUMN quote TEXT;
            ALTER TABLE notes ADD COLUMN note_type TEXT; -- public | private | shared-article | under-review | comment | article
            ALTER TABLE notes ADD COLUMN view_count INTEGER;
            ALTER TABLE notes ADD COLUMN like_count INTEGER;
            ALTER TABLE notes ADD COLUMN article_link TEXT;
        "#
        ),
        M::up(
            r#"
            CREATE TABLE schedules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                topic_id TEXT NOT NULL,
                schedule_at TEXT NOT NULL
            );

            CREATE TABLE schedule_organizations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_id INTEGER NOT NULL,
                organization_id INTEGER NOT NULL,

                FOREIGN KEY (parent_id) REFERENCES schedules (id)
            );
        "#
        ),
    ]);
}

pub const DEV_FIXTURES: &str = r#"
    INSERT INTO notes (note_content, topic_id, employee_id, is_public, is_approved_cbh, is_approved_emp, created_at)
    VALUES ('Written before note categories existed.', 3, '018f6146-32f4-7948-8289-cfb5cdb2b2af', 1, 1, 1, '2024-01-01T09:00:00.000Z');

    INSERT INTO notes (note_content, topic_id, employee_id, is_public, is_approved_cbh, is_approved_emp, address, note_type, view_count, like_count, created_at)
    VALUES ('I love this topic! It really helped me understand the concepts better.', 1, '018f6146-32f4-7948-8289-cfb5cdb2b2af', 1, 1, 1, 'Topic 1, Item 2', 'public', 15, 3, '2024-01-02T09:00:00.000Z');

    INSERT INTO notes (note_content, topic_id, employee_id, is_public, is_approved_cbh, is_approved_emp, address, note_type, created_at)
    VALUES ('This is my private note for later reference.', 1, '018f6146-32f4-7948-8289-cfb5cdb2b2af', 0, 0, 0, 'Topic 1, Item 3', 'private', '2024-01-03T09:00:00.000Z');

    INSERT INTO notes (note_content, topic_id, employee_id, is_public, is_approved_cbh, is_approved_emp, address, note_type, view_count, like_count, article_link, created_at)
    VALUES ('Worth sharing with the whole team.', 2, '018f6146-32f4-7948-8289-cfb5cdb2b2af', 1, 1, 1, 'Resource Library', 'shared-article', 12, 4, 'https://example.com/leadership-tips', '2024-01-04T09:00:00.000Z');
"#;
