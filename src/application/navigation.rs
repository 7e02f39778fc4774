#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Tasks,
    Notes,
    Calendar,
    Focus,
    StudyHub,
    Chat,
    StudyRoom,
    Settings,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Dashboard => "dashboard",
            Screen::Tasks => "tasks",
            Screen::Notes => "notes",
            Screen::Calendar => "calendar",
            Screen::Focus => "focus",
            Screen::StudyHub => "study_hub",
            Screen::Chat => "chat",
            Screen::StudyRoom => "study_room",
            Screen::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    Open(Screen),
    Back,
    Home,
}

/// Tracks the current screen and the trail behind it. Opening the screen
/// already shown pushes nothing, so Back never bounces between duplicates.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: Screen,
    history: Vec<Screen>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            current: Screen::Dashboard,
            history: Vec::new(),
        }
    }
}

impl Navigator {
    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn dispatch(&mut self, intent: NavIntent) -> Screen {
        match intent {
            NavIntent::Open(screen) => {
                if screen != self.current {
                    self.history.push(self.current);
                    self.current = screen;
                }
            }
            NavIntent::Back => {
                if let Some(previous) = self.history.pop() {
                    self.current = previous;
                }
            }
            NavIntent::Home => {
                self.history.clear();
                self.current = Screen::Dashboard;
            }
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_dashboard() {
        assert_eq!(Navigator::default().current(), Screen::Dashboard);
    }

    #[test]
    fn open_pushes_history_and_back_unwinds_it() {
        let mut navigator = Navigator::default();
        navigator.dispatch(NavIntent::Open(Screen::Tasks));
        navigator.dispatch(NavIntent::Open(Screen::Notes));

        assert_eq!(navigator.dispatch(NavIntent::Back), Screen::Tasks);
        assert_eq!(navigator.dispatch(NavIntent::Back), Screen::Dashboard);
        // Back on an empty trail stays put.
        assert_eq!(navigator.dispatch(NavIntent::Back), Screen::Dashboard);
    }

    #[test]
    fn reopening_current_screen_adds_no_history() {
        let mut navigator = Navigator::default();
        navigator.dispatch(NavIntent::Open(Screen::Focus));
        navigator.dispatch(NavIntent::Open(Screen::Focus));

        assert_eq!(navigator.dispatch(NavIntent::Back), Screen::Dashboard);
    }

    #[test]
    fn home_clears_the_trail() {
        let mut navigator = Navigator::default();
        navigator.dispatch(NavIntent::Open(Screen::Calendar));
        navigator.dispatch(NavIntent::Open(Screen::Settings));
        assert_eq!(navigator.dispatch(NavIntent::Home), Screen::Dashboard);
        assert_eq!(navigator.dispatch(NavIntent::Back), Screen::Dashboard);
    }
}
