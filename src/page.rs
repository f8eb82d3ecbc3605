use std::collections::BTreeMap;

use crate::behaviors::{
    Download, NotificationKind, Submission, TimerAction, alerts, clipboard, csv_export, dark_mode,
    fade_in, form_validation, image_fallback, notifications, tooltips,
};
use crate::collation::{Collator, DEFAULT_LOCALE};
use crate::dom::{Dom, NodeId, truncate_chars};
use crate::html::parse_html;
use crate::table::SortDirection;
use crate::table_sorter::{SORTABLE_HEADER_SELECTOR, SortOutcome};
use crate::{Error, Result};

const DEFAULT_ALERT_DISMISS_MS: i64 = 5_000;
const DEFAULT_NOTIFICATION_MS: i64 = 3_000;
const DEFAULT_COPY_FEEDBACK_MS: i64 = 2_000;
const DEFAULT_TIMER_STEP_LIMIT: usize = 10_000;
const DEFAULT_TRACE_LOG_LIMIT: usize = 10_000;

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: i64,
    scheduled_at: i64,
    due_at: i64,
    order: i64,
    action: TimerAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub action: &'static str,
}

#[derive(Debug)]
pub struct Page {
    dom: Dom,
    collator: Collator,
    task_queue: Vec<ScheduledTask>,
    now_ms: i64,
    timer_step_limit: usize,
    next_timer_id: i64,
    next_task_order: i64,
    alert_dismiss_ms: i64,
    notification_ms: i64,
    copy_feedback_ms: i64,
    clipboard: Option<String>,
    downloads: Vec<Download>,
    submissions: Vec<Submission>,
    local_storage: BTreeMap<String, String>,
    trace: bool,
    trace_events: bool,
    trace_timers: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_storage(html, BTreeMap::new())
    }

    /// Loads a page whose local storage already holds `local_storage`, as
    /// on a return visit.
    pub fn from_html_with_storage(
        html: &str,
        local_storage: BTreeMap<String, String>,
    ) -> Result<Self> {
        let dom = parse_html(html)?;
        let mut page = Self {
            dom,
            collator: Collator::new(DEFAULT_LOCALE).with_numeric(true),
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: DEFAULT_TIMER_STEP_LIMIT,
            next_timer_id: 1,
            next_task_order: 0,
            alert_dismiss_ms: DEFAULT_ALERT_DISMISS_MS,
            notification_ms: DEFAULT_NOTIFICATION_MS,
            copy_feedback_ms: DEFAULT_COPY_FEEDBACK_MS,
            clipboard: None,
            downloads: Vec::new(),
            submissions: Vec::new(),
            local_storage,
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_logs: Vec::new(),
            trace_log_limit: DEFAULT_TRACE_LOG_LIMIT,
            trace_to_stderr: true,
        };
        page.run_load_behaviors()?;
        Ok(page)
    }

    fn run_load_behaviors(&mut self) -> Result<()> {
        self.init_tooltips()?;

        let stored = self.local_storage.get(dark_mode::STORAGE_KEY).cloned();
        dark_mode::restore(&mut self.dom, stored.as_deref())?;

        for alert in alerts::auto_dismiss_candidates(&self.dom)? {
            self.schedule(self.alert_dismiss_ms, TimerAction::FadeOutAlert(alert));
        }
        Ok(())
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Runtime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        if self.trace_logs.len() > max_entries {
            let excess = self.trace_logs.len() - max_entries;
            self.trace_logs.drain(..excess);
        }
        Ok(())
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Runtime(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.timer_step_limit = max_steps;
        Ok(())
    }

    pub fn set_locale(&mut self, locale: &str) {
        self.collator = Collator::new(locale).with_numeric(true);
    }

    pub fn collator(&self) -> &Collator {
        &self.collator
    }

    /// Also moves alert dismissals that are still pending, counting from
    /// when each was scheduled.
    pub fn set_alert_dismiss_ms(&mut self, delay_ms: i64) -> Result<()> {
        self.alert_dismiss_ms = non_negative_delay("set_alert_dismiss_ms", delay_ms)?;
        for task in &mut self.task_queue {
            if matches!(task.action, TimerAction::FadeOutAlert(_)) {
                task.due_at = task.scheduled_at.saturating_add(delay_ms);
            }
        }
        Ok(())
    }

    pub fn set_notification_ms(&mut self, delay_ms: i64) -> Result<()> {
        self.notification_ms = non_negative_delay("set_notification_ms", delay_ms)?;
        Ok(())
    }

    pub fn set_copy_feedback_ms(&mut self, delay_ms: i64) -> Result<()> {
        self.copy_feedback_ms = non_negative_delay("set_copy_feedback_ms", delay_ms)?;
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.attr(target, "disabled").is_some() {
            self.trace_event_line(format!(
                "[event] click target={} skipped=disabled",
                self.node_label(target)
            ));
            return Ok(());
        }
        self.trace_event_line(format!("[event] click target={}", self.node_label(target)));

        if let Some(header) = self.dom.closest(target, SORTABLE_HEADER_SELECTOR)? {
            let outcome = self.dom.sort_by_header(header, None, &self.collator)?;
            self.trace_sort(header, outcome);
        }

        if let Some(alert) = alerts::close_target(&self.dom, target)? {
            self.dom.remove_node(alert)?;
            self.cancel_timers_for(alert);
            self.trace_behavior_line(format!("[behavior] alert closed {}", self.node_label(alert)));
        }

        if let Some(trigger) = self.dom.closest(target, clipboard::COPY_TRIGGER_SELECTOR)? {
            self.copy_to_clipboard(trigger)?;
        }

        if let Some(trigger) = self.dom.closest(target, csv_export::EXPORT_TRIGGER_SELECTOR)? {
            if let Some(download) = csv_export::export_from_trigger(&self.dom, trigger)? {
                self.trace_behavior_line(format!(
                    "[behavior] csv export file={} bytes={}",
                    download.filename,
                    download.contents.len()
                ));
                self.downloads.push(download);
            }
        }

        if self.dom.closest(target, dark_mode::TOGGLE_SELECTOR)?.is_some() {
            if let Some(enabled) = dark_mode::toggle(&mut self.dom)? {
                self.local_storage.insert(
                    dark_mode::STORAGE_KEY.to_string(),
                    dark_mode::storage_value(enabled).to_string(),
                );
                self.trace_behavior_line(format!("[behavior] dark mode enabled={enabled}"));
            }
        }

        self.toggle_checkable(target)?;

        if self.is_submit_control(target) {
            if let Some(form) = self.dom.find_ancestor_by_tag(target, "form") {
                self.submit_form(form)?;
            }
        }

        Ok(())
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let is_text_control = self.dom.is_tag(target, "textarea")
            || (self.dom.is_tag(target, "input") && !form_validation::is_checkable(&self.dom, target));
        if !is_text_control {
            return Err(Error::Runtime(format!(
                "type_text target is not a text control: {selector}"
            )));
        }
        if self.dom.attr(target, "disabled").is_some() || self.dom.attr(target, "readonly").is_some() {
            return Ok(());
        }

        self.dom.set_value(target, text)?;
        self.trace_event_line(format!("[event] input target={}", self.node_label(target)));
        self.revalidate(target)
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if !form_validation::is_checkable(&self.dom, target) {
            return Err(Error::Runtime(format!(
                "set_checked target is not a checkbox or radio: {selector}"
            )));
        }
        if self.dom.checked(target)? == checked {
            return Ok(());
        }
        if checked {
            self.uncheck_other_radios_in_group(target)?;
        }
        self.dom.set_checked(target, checked)?;
        self.trace_event_line(format!("[event] change target={}", self.node_label(target)));
        self.revalidate(target)
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let form = if self.dom.is_tag(target, "form") {
            Some(target)
        } else {
            self.dom.find_ancestor_by_tag(target, "form")
        };
        if let Some(form) = form {
            self.submit_form(form)?;
        }
        Ok(())
    }

    pub fn fail_image(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.trace_event_line(format!("[event] error target={}", self.node_label(target)));
        if image_fallback::apply_fallback(&mut self.dom, target)? {
            self.trace_behavior_line(format!(
                "[behavior] image fallback {}",
                self.node_label(target)
            ));
        }
        Ok(())
    }

    pub fn scroll_into_view(&mut self, selector: &str) -> Result<()> {
        for node in self.dom.query_selector_all(selector)? {
            if fade_in::reveal(&mut self.dom, node)? {
                self.trace_behavior_line(format!("[behavior] fade-in {}", self.node_label(node)));
            }
        }
        Ok(())
    }

    pub fn notify(&mut self, message: &str, kind: NotificationKind) -> Result<()> {
        let toast = notifications::show(&mut self.dom, message, kind)?;
        self.schedule(self.notification_ms, TimerAction::RemoveNode(toast));
        self.trace_behavior_line(format!("[behavior] notify kind={}", kind.as_str()));
        Ok(())
    }

    /// Re-runs tooltip and popover initialization, e.g. after markup was
    /// added. Already initialized triggers are skipped.
    pub fn init_tooltips(&mut self) -> Result<(usize, usize)> {
        let (tooltips, popovers) = tooltips::init_all(&mut self.dom)?;
        if tooltips + popovers > 0 {
            self.trace_behavior_line(format!(
                "[behavior] init tooltips={tooltips} popovers={popovers}"
            ));
        }
        Ok((tooltips, popovers))
    }

    pub fn tooltip_count(&self) -> Result<usize> {
        tooltips::initialized_count(&self.dom, tooltips::TOOLTIP_SELECTOR)
    }

    pub fn popover_count(&self) -> Result<usize> {
        tooltips::initialized_count(&self.dom, tooltips::POPOVER_SELECTOR)
    }

    /// Sorts the table owning `header_selector` in `direction` without the
    /// click toggle.
    pub fn sort_column(&mut self, header_selector: &str, direction: SortDirection) -> Result<()> {
        let header = self.select_one(header_selector)?;
        let outcome = self
            .dom
            .sort_by_header(header, Some(direction), &self.collator)?;
        self.trace_sort(header, outcome);
        Ok(())
    }

    /// Current direction marker of a sortable header.
    pub fn sort_marker(&self, header_selector: &str) -> Result<Option<SortDirection>> {
        let header = self.select_one(header_selector)?;
        Ok(self.dom.header_marker(header))
    }

    /// Trimmed text of `column` for each body row of the table.
    pub fn column_texts(&self, table_selector: &str, column: usize) -> Result<Vec<String>> {
        let table = self.select_one(table_selector)?;
        let Some(body) = self.dom.table_body(table) else {
            return Ok(Vec::new());
        };
        Ok(self
            .dom
            .body_rows(body)
            .into_iter()
            .map(|row| {
                self.dom
                    .row_cells(row)
                    .get(column)
                    .map(|cell| self.dom.text_content(*cell).trim().to_string())
                    .unwrap_or_default()
            })
            .collect())
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    pub fn is_checked(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.checked(target)
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.class_contains(target, class_name))
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    pub fn downloads(&self) -> &[Download] {
        &self.downloads
    }

    pub fn take_downloads(&mut self) -> Vec<Download> {
        std::mem::take(&mut self.downloads)
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn local_storage(&self) -> &BTreeMap<String, String> {
        &self.local_storage
    }

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                action: task.action.name(),
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != timer_id);
        before != self.task_queue.len()
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.task_queue.len();
        self.task_queue.clear();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Runtime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.now_ms;
        let target = self.now_ms.saturating_add(delta_ms);
        let ran = self.run_timer_queue(Some(target))?;
        self.now_ms = target;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={delta_ms} from={from} to={} ran_due={ran}",
            self.now_ms
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.now_ms {
            return Err(Error::Runtime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        let from = self.now_ms;
        let ran = self.run_timer_queue(Some(target_ms))?;
        self.now_ms = target_ms;
        self.trace_timer_line(format!(
            "[timer] advance_to from={from} to={} ran_due={ran}",
            self.now_ms
        ));
        Ok(())
    }

    /// Runs every pending timer, moving the clock to each due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.now_ms;
        let ran = self.run_timer_queue(None)?;
        self.trace_timer_line(format!(
            "[timer] flush from={from} to={} ran={ran}",
            self.now_ms
        ));
        Ok(())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, actual));
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, actual));
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name);
        if actual != expected {
            let describe = |present: bool| {
                if present {
                    format!("class {class_name}")
                } else {
                    format!("no class {class_name}")
                }
            };
            return Err(self.assertion_failed(selector, target, &describe(expected), describe(actual)));
        }
        Ok(())
    }

    pub fn assert_column(&self, table_selector: &str, column: usize, expected: &[&str]) -> Result<()> {
        let actual = self.column_texts(table_selector, column)?;
        if actual != expected {
            let target = self.select_one(table_selector)?;
            return Err(self.assertion_failed(
                table_selector,
                target,
                &expected.join(","),
                actual.join(","),
            ));
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    fn assertion_failed(&self, selector: &str, target: NodeId, expected: &str, actual: String) -> Error {
        Error::AssertionFailed {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual,
            dom_snippet: self.node_snippet(target),
        }
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    fn copy_to_clipboard(&mut self, trigger: NodeId) -> Result<()> {
        let Some(text) = clipboard::copy_from_trigger(&mut self.dom, trigger)? else {
            self.trace_behavior_line(format!(
                "[behavior] copy skipped, no target for {}",
                self.node_label(trigger)
            ));
            return Ok(());
        };
        self.trace_behavior_line(format!("[behavior] copied chars={}", text.chars().count()));
        self.clipboard = Some(text);
        self.task_queue
            .retain(|task| task.action != TimerAction::RestoreLabel(trigger));
        self.schedule(self.copy_feedback_ms, TimerAction::RestoreLabel(trigger));
        Ok(())
    }

    fn toggle_checkable(&mut self, target: NodeId) -> Result<()> {
        match form_validation::input_type(&self.dom, target).as_str() {
            "checkbox" => {
                let current = self.dom.checked(target)?;
                self.dom.set_checked(target, !current)?;
                self.revalidate(target)
            }
            "radio" if !self.dom.checked(target)? => {
                self.uncheck_other_radios_in_group(target)?;
                self.dom.set_checked(target, true)?;
                self.revalidate(target)
            }
            _ => Ok(()),
        }
    }

    fn uncheck_other_radios_in_group(&mut self, target: NodeId) -> Result<()> {
        if form_validation::input_type(&self.dom, target) != "radio" {
            return Ok(());
        }
        let Some(name) = self.dom.attr(target, "name") else {
            return Ok(());
        };
        let scope = self
            .dom
            .find_ancestor_by_tag(target, "form")
            .unwrap_or(self.dom.root);
        for other in self.dom.query_selector_all_from(scope, "input")? {
            if other != target
                && form_validation::input_type(&self.dom, other) == "radio"
                && self.dom.attr(other, "name").as_deref() == Some(name.as_str())
            {
                self.dom.set_checked(other, false)?;
            }
        }
        Ok(())
    }

    fn revalidate(&mut self, control: NodeId) -> Result<()> {
        if let Some(valid) = form_validation::revalidate_control(&mut self.dom, control)? {
            self.trace_behavior_line(format!(
                "[behavior] revalidate {} valid={valid}",
                self.node_label(control)
            ));
        }
        Ok(())
    }

    fn is_submit_control(&self, node: NodeId) -> bool {
        if self.dom.is_tag(node, "button") {
            return self
                .dom
                .attr(node, "type")
                .is_none_or(|kind| kind.eq_ignore_ascii_case("submit"));
        }
        self.dom.is_tag(node, "input")
            && matches!(
                form_validation::input_type(&self.dom, node).as_str(),
                "submit" | "image"
            )
    }

    fn submit_form(&mut self, form: NodeId) -> Result<()> {
        self.trace_event_line(format!("[event] submit target={}", self.node_label(form)));
        if self
            .dom
            .class_contains(form, form_validation::VALIDATED_FORM_CLASS)
            && !form_validation::validate_form(&mut self.dom, form)?
        {
            self.trace_behavior_line(format!(
                "[behavior] submit blocked {}",
                self.node_label(form)
            ));
            return Ok(());
        }
        let entries = form_validation::form_entries(&self.dom, form)?;
        self.submissions.push(Submission {
            form_id: self.dom.attr(form, "id"),
            entries,
        });
        Ok(())
    }

    fn schedule(&mut self, delay_ms: i64, action: TimerAction) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        let due_at = self.now_ms.saturating_add(delay_ms.max(0));
        self.trace_timer_line(format!(
            "[timer] schedule id={id} action={} due_at={due_at}",
            action.name()
        ));
        self.task_queue.push(ScheduledTask {
            id,
            scheduled_at: self.now_ms,
            due_at,
            order,
            action,
        });
        id
    }

    fn cancel_timers_for(&mut self, node: NodeId) {
        self.task_queue.retain(|task| task.action.node() != node);
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.next_task_index(due_limit) {
            steps += 1;
            if steps > self.timer_step_limit {
                return Err(Error::Runtime(format!(
                    "timer queue exceeded max steps: limit={}, now_ms={}, pending_tasks={}",
                    self.timer_step_limit,
                    self.now_ms,
                    self.task_queue.len()
                )));
            }
            let task = self.task_queue.remove(next_idx);
            if task.due_at > self.now_ms {
                self.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace_timer_line(format!(
            "[timer] run id={} action={} due_at={} now_ms={}",
            task.id,
            task.action.name(),
            task.due_at,
            self.now_ms
        ));
        match task.action {
            TimerAction::FadeOutAlert(alert) => {
                if alerts::start_fade(&mut self.dom, alert)? {
                    self.schedule(alerts::FADE_MS, TimerAction::RemoveNode(alert));
                }
            }
            TimerAction::RemoveNode(node) => {
                if self.dom.is_connected(node) {
                    self.dom.remove_node(node)?;
                }
            }
            TimerAction::RestoreLabel(trigger) => {
                clipboard::restore_label(&mut self.dom, trigger)?;
            }
        }
        Ok(())
    }

    fn trace_sort(&mut self, header: NodeId, outcome: Option<SortOutcome>) {
        if !self.trace {
            return;
        }
        let line = match outcome {
            Some(outcome) => format!(
                "[sort] table={} column={} direction={} rows={}",
                self.node_label(outcome.table),
                outcome.column,
                outcome.direction.as_str(),
                outcome.rows
            ),
            None => format!("[sort] header={} skipped=no-rows", self.node_label(header)),
        };
        self.trace_line(line);
    }

    fn node_label(&self, node: NodeId) -> String {
        let tag = self.dom.tag_name(node).unwrap_or("#node");
        if let Some(id) = self.dom.attr(node, "id").filter(|id| !id.is_empty()) {
            return format!("{tag}#{id}");
        }
        match self.dom.attr(node, "class") {
            Some(classes) if !classes.trim().is_empty() => {
                format!("{tag}.{}", classes.split_whitespace().collect::<Vec<_>>().join("."))
            }
            _ => tag.to_string(),
        }
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.trace_line(line);
        }
    }

    fn trace_timer_line(&mut self, line: String) {
        if self.trace && self.trace_timers {
            self.trace_line(line);
        }
    }

    fn trace_behavior_line(&mut self, line: String) {
        self.trace_line(line);
    }

    fn trace_line(&mut self, line: String) {
        if self.trace {
            if self.trace_to_stderr {
                eprintln!("{line}");
            }
            if self.trace_logs.len() >= self.trace_log_limit {
                self.trace_logs.remove(0);
            }
            self.trace_logs.push(line);
        }
    }
}

fn non_negative_delay(setter: &str, delay_ms: i64) -> Result<i64> {
    if delay_ms < 0 {
        return Err(Error::Runtime(format!(
            "{setter} requires non-negative milliseconds"
        )));
    }
    Ok(delay_ms)
}
