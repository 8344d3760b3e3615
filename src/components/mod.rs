pub mod notices;
pub mod quick_actions;
pub mod report_form;
pub mod report_prompt;
