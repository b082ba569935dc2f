//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records, active and trashed.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning user identifier.
        user_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Task description.
        description -> Text,
        /// Combined due date and time, if any.
        due_datetime -> Nullable<Timestamptz>,
        /// Completion flag.
        completed -> Bool,
        /// Cached overdue flag, refreshed by the sweep.
        overdue -> Bool,
        /// Soft-deletion timestamp; set while the task is in the trash.
        deleted_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
