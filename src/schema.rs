// Written to match the table created by `create_feedback_table`. Every text column is NOT NULL so
// absent form fields are stored as empty strings.

diesel::table! {
    feedback (id) {
        id -> Integer,
        overall -> Text,
        program -> Text,
        food -> Text,
        management -> Text,
        venue -> Text,
        favorite -> Text,
        suggestions -> Text,
        contribute -> Text,
        comments -> Text,
        timestamp -> Text,
    }
}
