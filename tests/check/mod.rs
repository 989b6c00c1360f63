mod allowed_changes_are_not_reported;
mod ignored_files_are_never_reported;
mod render_one_alert_per_hunk;
mod repeated_runs_report_the_same_changes;
mod report_deleted_files;
mod report_files_in_deleted_directories;
mod report_modified_files;
mod report_new_files;
mod report_nothing_when_no_files_are_changed;
mod resolve_references;
mod special_files_are_never_reported;
mod stat_cache_does_not_hide_changes;
