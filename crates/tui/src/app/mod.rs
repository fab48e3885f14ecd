use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::{
    client::{Client, ClientError},
    config::AppConfig,
    error::{AppError, Result},
    local_state::JsonFileStore,
    quick_add,
    repository::{RepositoryError, TransactionRepository},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

use engine::{
    Category, DATE_FORMAT, Period, SortKey, Transaction, TransactionDraft, TransactionPatch,
};

pub mod form;

pub use form::{FormField, FormMode, TransactionForm};

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Transactions,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Dashboard => "Dashboard",
            Self::Transactions => "Transactions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub level: ToastLevel,
    pub message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    QuickAdd,
    NewCategory,
    ConfirmDelete(i64),
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::QuickAdd => "Quick add  (+1000 salary #food)",
            Self::NewCategory => "New category",
            Self::ConfirmDelete(_) => "Delete transaction? (y/n)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
    pub error: Option<String>,
}

impl Prompt {
    fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
            error: None,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub login: LoginState,
    pub period: Period,
    pub sort: SortKey,
    pub selected: usize,
    pub form: Option<TransactionForm>,
    pub prompt: Option<Prompt>,
    /// Highlighted row of the open sort menu.
    pub sort_menu: Option<usize>,
    pub toast: Option<ToastState>,
    /// Label of the remote call in flight.
    pub busy: Option<&'static str>,
    pub base_url: String,
    pub currency_symbol: String,
}

/// User intents that need the remote store.
#[derive(Debug)]
enum Intent {
    Login,
    Reload,
    Add(TransactionDraft),
    Edit(i64, TransactionPatch),
    Delete(i64),
    AddCategory(String),
}

impl Intent {
    fn label(&self) -> &'static str {
        match self {
            Self::Login | Self::Reload => "Loading…",
            Self::Add(_) | Self::Edit(_, _) => "Saving…",
            Self::Delete(_) => "Deleting…",
            Self::AddCategory(_) => "Creating category…",
        }
    }
}

pub struct App {
    repository: TransactionRepository<Client, JsonFileStore>,
    pub state: AppState,
    pending: Option<Intent>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let local = JsonFileStore::open_or_empty(&config.state_path);
        let state = AppState {
            screen: Screen::Login,
            login: LoginState {
                username: config.username.clone(),
                password: String::new(),
                focus: if config.username.is_empty() {
                    LoginField::Username
                } else {
                    LoginField::Password
                },
                message: None,
            },
            period: Period::current(),
            sort: SortKey::None,
            selected: 0,
            form: None,
            prompt: None,
            sort_menu: None,
            toast: None,
            busy: None,
            base_url: client.base_url().to_string(),
            currency_symbol: config.currency_symbol.clone(),
        };

        Ok(Self {
            repository: TransactionRepository::new(client, local),
            state,
            pending: None,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            self.expire_toast();
            let snapshot = self
                .repository
                .snapshot(self.state.period, self.state.sort);
            terminal
                .draw(|frame| ui::render(frame, &self.state, &snapshot))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            // The frame above already shows the busy indicator.
            if let Some(intent) = self.pending.take() {
                self.execute(intent).await;
                continue;
            }

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn enqueue(&mut self, intent: Intent) {
        self.state.busy = Some(intent.label());
        self.pending = Some(intent);
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.state.toast = Some(ToastState {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn expire_toast(&mut self) {
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= Instant::now())
        {
            self.state.toast = None;
        }
    }

    fn categories(&self) -> &[Category] {
        self.repository.categories()
    }

    fn selected_transaction(&mut self) -> Option<Transaction> {
        let view = self.repository.view(self.state.period, self.state.sort);
        view.transactions.get(self.state.selected).cloned()
    }

    fn clamp_selection(&mut self) {
        let len = self
            .repository
            .view(self.state.period, self.state.sort)
            .transactions
            .len();
        self.state.selected = self.state.selected.min(len.saturating_sub(1));
    }

    async fn execute(&mut self, intent: Intent) {
        match intent {
            Intent::Login => match self.repository.load().await {
                Ok(()) => {
                    self.state.screen = Screen::Dashboard;
                    self.state.login.message = None;
                    self.state.login.password.clear();
                    let count = self.repository.transactions().len();
                    self.toast(ToastLevel::Info, format!("Loaded {count} transactions."));
                }
                Err(err) => {
                    self.state.login.message = Some(message_for_error(&err));
                }
            },
            Intent::Reload => match self.repository.load().await {
                Ok(()) => {
                    tracing::debug!("reloaded at revision {}", self.repository.revision());
                    self.toast(ToastLevel::Info, "Refreshed.");
                }
                Err(err) => self.toast(ToastLevel::Error, message_for_error(&err)),
            },
            Intent::Add(draft) => match self.repository.add_transaction(draft).await {
                Ok(()) => {
                    self.state.form = None;
                    self.state.prompt = None;
                    self.toast(ToastLevel::Success, "Transaction saved.");
                }
                Err(err) => {
                    let message = message_for_error(&err);
                    if let Some(form) = self.state.form.as_mut() {
                        form.error = Some(message.clone());
                    }
                    self.toast(ToastLevel::Error, message);
                }
            },
            Intent::Edit(id, patch) => {
                self.state.form = None;
                match self.repository.edit_transaction(id, patch).await {
                    Ok(()) => self.toast(ToastLevel::Success, "Transaction updated."),
                    Err(err) => self.toast(ToastLevel::Error, message_for_error(&err)),
                }
            }
            Intent::Delete(id) => {
                match self.repository.delete_transaction(id).await {
                    Ok(()) => self.toast(ToastLevel::Success, "Transaction deleted."),
                    Err(err) => self.toast(ToastLevel::Error, message_for_error(&err)),
                }
                self.clamp_selection();
            }
            Intent::AddCategory(name) => match self.repository.add_category(&name).await {
                Ok(category) => {
                    self.state.prompt = None;
                    if let Some(form) = self.state.form.as_mut() {
                        form.category_id = Some(category.id);
                    }
                    self.toast(
                        ToastLevel::Success,
                        format!("Category \"{}\" created.", category.name),
                    );
                }
                Err(err @ (RepositoryError::DuplicateCategory(_) | RepositoryError::Invalid(_))) => {
                    if let Some(prompt) = self.state.prompt.as_mut() {
                        prompt.error = Some(message_for_error(&err));
                    }
                }
                Err(err) => {
                    self.state.prompt = None;
                    self.toast(ToastLevel::Error, message_for_error(&err));
                }
            },
        }
        self.state.busy = None;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }

        if self.state.prompt.is_some() {
            self.handle_prompt_key(action);
        } else if self.state.sort_menu.is_some() {
            self.handle_sort_menu_key(action);
        } else if self.state.form.is_some() {
            self.handle_form_key(action);
        } else if self.state.screen == Screen::Login {
            self.handle_login_key(action);
        } else {
            self.handle_main_key(action);
        }
    }

    fn handle_login_key(&mut self, action: AppAction) {
        let login = &mut self.state.login;
        match action {
            AppAction::Cancel => self.should_quit = true,
            AppAction::NextField | AppAction::Up | AppAction::Down => {
                login.focus = match login.focus {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            AppAction::Backspace => {
                login_field_mut(login).pop();
            }
            AppAction::Input(ch) => login_field_mut(login).push(ch),
            AppAction::Submit => self.attempt_login(),
            _ => {}
        }
    }

    fn attempt_login(&mut self) {
        let username = self.state.login.username.trim().to_string();
        let password = self.state.login.password.clone();

        if username.is_empty() || password.is_empty() {
            self.state.login.message = Some("Fill in both fields.".to_string());
            return;
        }

        tracing::info!("logging in as {username}");
        self.repository
            .remote_mut()
            .set_credentials(&username, &password);
        self.repository.set_user(&username);
        self.enqueue(Intent::Login);
    }

    fn handle_main_key(&mut self, action: AppAction) {
        match action {
            AppAction::NextField => {
                self.state.screen = match self.state.screen {
                    Screen::Dashboard => Screen::Transactions,
                    _ => Screen::Dashboard,
                };
            }
            AppAction::Left => self.set_period(self.state.period.prev()),
            AppAction::Right => self.set_period(self.state.period.next()),
            AppAction::Up => self.state.selected = self.state.selected.saturating_sub(1),
            AppAction::Down => {
                self.state.selected += 1;
                self.clamp_selection();
            }
            AppAction::Submit => self.open_edit_form(),
            AppAction::Input(ch) => self.handle_main_char(ch),
            _ => {}
        }
    }

    fn handle_main_char(&mut self, ch: char) {
        match ch {
            'q' => self.should_quit = true,
            'h' | '1' => self.state.screen = Screen::Dashboard,
            't' | '2' => self.state.screen = Screen::Transactions,
            '[' => self.set_period(self.state.period.prev()),
            ']' => self.set_period(self.state.period.next()),
            'g' => self.set_period(Period::current()),
            'k' => self.state.selected = self.state.selected.saturating_sub(1),
            'j' => {
                self.state.selected += 1;
                self.clamp_selection();
            }
            's' => {
                let current = SortKey::ALL
                    .iter()
                    .position(|key| *key == self.state.sort)
                    .unwrap_or(0);
                self.state.sort_menu = Some(current);
            }
            'a' => {
                self.state.form = Some(TransactionForm::add(Local::now().date_naive()));
            }
            'e' => self.open_edit_form(),
            'd' => {
                if let Some(tx) = self.selected_transaction() {
                    self.state.prompt = Some(Prompt::new(PromptKind::ConfirmDelete(tx.id)));
                }
            }
            'c' => self.state.prompt = Some(Prompt::new(PromptKind::NewCategory)),
            'i' | ':' => self.state.prompt = Some(Prompt::new(PromptKind::QuickAdd)),
            'r' if self.repository.is_ready() => self.enqueue(Intent::Reload),
            _ => {}
        }
    }

    fn set_period(&mut self, period: Period) {
        self.state.period = period;
        self.state.selected = 0;
    }

    fn open_edit_form(&mut self) {
        if self.state.screen != Screen::Transactions {
            return;
        }
        if let Some(tx) = self.selected_transaction() {
            self.state.form = Some(TransactionForm::edit(&tx));
        }
    }

    fn handle_sort_menu_key(&mut self, action: AppAction) {
        let Some(highlighted) = self.state.sort_menu else {
            return;
        };
        let last = SortKey::ALL.len() - 1;
        match action {
            AppAction::Cancel | AppAction::Input('q') => self.state.sort_menu = None,
            AppAction::Up | AppAction::Input('k') => {
                self.state.sort_menu = Some(highlighted.saturating_sub(1));
            }
            AppAction::Down | AppAction::Input('j') => {
                self.state.sort_menu = Some((highlighted + 1).min(last));
            }
            AppAction::Submit => {
                self.state.sort = SortKey::ALL[highlighted.min(last)];
                self.state.sort_menu = None;
                self.state.selected = 0;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, action: AppAction) {
        let categories = self.repository.categories().to_vec();
        let Some(form) = self.state.form.as_mut() else {
            return;
        };

        match action {
            AppAction::Cancel => self.state.form = None,
            AppAction::NextField | AppAction::Down => form.focus = form.focus.next(),
            AppAction::Up => form.focus = form.focus.prev(),
            AppAction::Left => form.cycle(&categories, false),
            AppAction::Right => form.cycle(&categories, true),
            AppAction::Backspace => {
                if let Some(text) = form.active_text_mut() {
                    text.pop();
                }
            }
            AppAction::Input(ch) => {
                if let Some(text) = form.active_text_mut() {
                    text.push(ch);
                } else if form.focus == FormField::Category && ch == '+' {
                    self.state.prompt = Some(Prompt::new(PromptKind::NewCategory));
                } else if ch == ' ' {
                    form.cycle(&categories, true);
                }
            }
            AppAction::Submit => self.submit_form(),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.state.form.as_ref() else {
            return;
        };

        let intent = match form.mode {
            FormMode::Add => form.to_draft().map(Intent::Add),
            FormMode::Edit(id) => match self.repository.find(id) {
                Some(original) => form.to_patch(original).map(|patch| Intent::Edit(id, patch)),
                None => Err("The transaction no longer exists.".to_string()),
            },
        };

        match intent {
            Ok(intent) => self.enqueue(intent),
            Err(message) => {
                if let Some(form) = self.state.form.as_mut() {
                    form.error = Some(message);
                }
            }
        }
    }

    fn handle_prompt_key(&mut self, action: AppAction) {
        let Some(prompt) = self.state.prompt.as_mut() else {
            return;
        };

        if let PromptKind::ConfirmDelete(id) = prompt.kind {
            match action {
                AppAction::Input('y') | AppAction::Input('Y') | AppAction::Submit => {
                    self.state.prompt = None;
                    self.enqueue(Intent::Delete(id));
                }
                AppAction::Input(_) | AppAction::Cancel => self.state.prompt = None,
                _ => {}
            }
            return;
        }

        match action {
            AppAction::Cancel => self.state.prompt = None,
            AppAction::Backspace => {
                prompt.input.pop();
            }
            AppAction::Input(ch) => prompt.input.push(ch),
            AppAction::Submit => match prompt.kind {
                PromptKind::NewCategory => {
                    let name = prompt.input.clone();
                    self.enqueue(Intent::AddCategory(name));
                }
                PromptKind::QuickAdd => self.submit_quick_add(),
                PromptKind::ConfirmDelete(_) => {}
            },
            _ => {}
        }
    }

    fn submit_quick_add(&mut self) {
        let Some(prompt) = self.state.prompt.as_ref() else {
            return;
        };

        match quick_add_draft(&prompt.input, self.categories()) {
            Ok(draft) => self.enqueue(Intent::Add(draft)),
            Err(message) => {
                if let Some(prompt) = self.state.prompt.as_mut() {
                    prompt.error = Some(message);
                }
            }
        }
    }
}

fn login_field_mut(login: &mut LoginState) -> &mut String {
    match login.focus {
        LoginField::Username => &mut login.username,
        LoginField::Password => &mut login.password,
    }
}

/// Builds a draft dated today from quick-add input. The tag must name an
/// existing category (case-insensitive).
fn quick_add_draft(input: &str, categories: &[Category]) -> std::result::Result<TransactionDraft, String> {
    let parsed = quick_add::parse(input)?;
    let category_id = match &parsed.category {
        Some(tag) => Some(resolve_tag(tag, categories)?),
        None => None,
    };

    TransactionDraft {
        title: parsed.title,
        amount: parsed.amount,
        category_id,
        date: Local::now().date_naive().format(DATE_FORMAT).to_string(),
        kind: parsed.kind,
    }
    .validated()
    .map_err(|err| err.to_string())
}

/// An exact name wins; otherwise the tag must match a single category ignoring case.
fn resolve_tag(tag: &str, categories: &[Category]) -> std::result::Result<i64, String> {
    if let Some(exact) = categories.iter().find(|c| c.name == tag) {
        return Ok(exact.id);
    }
    let wanted = tag.to_lowercase();
    let mut matches = categories.iter().filter(|c| c.name.to_lowercase() == wanted);
    match (matches.next(), matches.next()) {
        (Some(only), None) => Ok(only.id),
        (Some(_), Some(_)) => Err(format!("Ambiguous category #{tag}.")),
        (None, _) => Err(format!("Unknown category #{tag}.")),
    }
}

fn message_for_error(err: &RepositoryError) -> String {
    match err {
        RepositoryError::Remote(ClientError::Unauthorized) => "Invalid credentials.".to_string(),
        RepositoryError::Remote(ClientError::NotFound) => {
            "Record not found; data reloaded.".to_string()
        }
        RepositoryError::Remote(ClientError::Conflict(message)) => format!("Conflict: {message}"),
        RepositoryError::Remote(ClientError::Validation(message)) => {
            format!("Rejected by server: {message}")
        }
        RepositoryError::Remote(ClientError::Server(message)) => format!("Server error: {message}"),
        RepositoryError::Remote(ClientError::Transport(err)) => {
            format!("Server unreachable: {err}")
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use engine::{Money, TransactionType};

    use super::*;

    fn categories() -> Vec<Category> {
        vec![Category {
            id: 3,
            name: "Food".to_string(),
        }]
    }

    #[test]
    fn quick_add_resolves_tag_to_category() {
        let draft = quick_add_draft("+1000 salary #food", &categories()).unwrap();
        assert_eq!(draft.kind, TransactionType::Income);
        assert_eq!(draft.amount, Money::new(100_000));
        assert_eq!(draft.title, "salary");
        assert_eq!(draft.category_id, Some(3));
    }

    #[test]
    fn quick_add_rejects_unknown_tag() {
        let err = quick_add_draft("12 pizza #takeaway", &categories()).unwrap_err();
        assert!(err.contains("takeaway"));
    }

    #[test]
    fn quick_add_tag_prefers_exact_name_and_rejects_ambiguity() {
        let categories = vec![
            Category {
                id: 3,
                name: "Food".to_string(),
            },
            Category {
                id: 4,
                name: "food".to_string(),
            },
        ];
        let draft = quick_add_draft("12 pizza #Food", &categories).unwrap();
        assert_eq!(draft.category_id, Some(3));
        let draft = quick_add_draft("12 pizza #food", &categories).unwrap();
        assert_eq!(draft.category_id, Some(4));

        let err = quick_add_draft("12 pizza #FOOD", &categories).unwrap_err();
        assert_eq!(err, "Ambiguous category #FOOD.");
    }

    #[test]
    fn error_messages_name_the_failure() {
        let err = RepositoryError::DuplicateCategory("Food".to_string());
        assert_eq!(message_for_error(&err), "category \"Food\" already exists");

        let err = RepositoryError::Remote(ClientError::Unauthorized);
        assert_eq!(message_for_error(&err), "Invalid credentials.");
    }
}
