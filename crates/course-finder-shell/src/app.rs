// SPDX-License-Identifier: AGPL-3.0
// Course Finder Shell - Application
//
// Maps commands onto the core stores and renders the result as text.

use crate::command::{Command, HELP};
use course_finder_core::{AppState, Course, StoreWarning};

/// Result of handling one command
#[derive(Debug, Default)]
pub struct Response {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Response {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            quit: false,
        }
    }

    fn push(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn with_warnings(mut self, warnings: impl IntoIterator<Item = StoreWarning>) -> Self {
        for warning in warnings {
            self.push(format!("(not saved: {})", warning));
        }
        self
    }
}

pub struct App {
    state: AppState,
    courses: Vec<Course>,
    filter: Option<String>,
}

impl App {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            courses: Vec::new(),
            filter: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Courses currently listed, after the local filter
    fn visible(&self) -> Vec<&Course> {
        let filter = self.filter.as_deref().unwrap_or("");
        self.courses.iter().filter(|c| c.matches(filter)).collect()
    }

    /// 1-based lookup into the visible list
    fn course_at(&self, n: usize) -> Option<Course> {
        let index = n.checked_sub(1)?;
        self.visible().get(index).map(|c| (*c).clone())
    }

    /// Persistence problems absorbed while starting up
    pub fn startup_notice(&self) -> Vec<String> {
        self.state
            .startup_warnings
            .iter()
            .map(|warning| format!("warning: {}", warning))
            .collect()
    }

    pub async fn handle(&mut self, command: Command) -> Response {
        let needs_session = matches!(
            command,
            Command::Search(_)
                | Command::Filter(_)
                | Command::Show(_)
                | Command::Fav(_)
                | Command::Unfav(_)
                | Command::Favs
                | Command::ClearFavs
                | Command::Avatar(_)
        );
        if needs_session && !self.state.auth.is_authenticated() {
            return Response::line("Please log in first");
        }

        match command {
            Command::Login { username, password } => self.login(&username, &password).await,
            Command::Logout => {
                let warnings = self.state.session.perform_logout().await;
                self.courses.clear();
                self.filter = None;
                Response::line("Signed out").with_warnings(warnings)
            }
            Command::WhoAmI => self.whoami(),
            Command::Avatar(image) => {
                let warning = self.state.auth.update_profile_image(image).await;
                Response::line("Profile image updated").with_warnings(warning)
            }
            Command::Search(query) => self.search(query).await,
            Command::Filter(text) => {
                self.filter = text;
                self.list()
            }
            Command::Show(n) => match self.course_at(n) {
                Some(course) => self.details(&course),
                None => Response::line(format!("No course {}", n)),
            },
            Command::Fav(n) => match self.course_at(n) {
                Some(course) => {
                    let title = course.title.clone();
                    let (added, warning) = self.state.favourites.toggle(course).await;
                    let message = if added {
                        format!("Added '{}' to favourites", title)
                    } else {
                        format!("Removed '{}' from favourites", title)
                    };
                    Response::line(message).with_warnings(warning)
                }
                None => Response::line(format!("No course {}", n)),
            },
            Command::Unfav(key) => {
                if !self.state.favourites.contains(&key) {
                    return Response::line(format!("'{}' is not a favourite", key));
                }
                let warning = self.state.favourites.remove(key).await;
                Response::line("Removed from favourites").with_warnings(warning)
            }
            Command::Favs => self.favourites(),
            Command::ClearFavs => {
                let warning = self.state.favourites.clear().await;
                Response::line("Favourites cleared").with_warnings(warning)
            }
            Command::Theme => {
                let warning = self.state.theme.toggle().await;
                let theme = self.state.theme.theme();
                Response::line(format!(
                    "Theme: {} (background {}, text {})",
                    self.state.theme.mode().as_str(),
                    theme.colors.background,
                    theme.colors.text
                ))
                .with_warnings(warning)
            }
            Command::Help => Response::line(HELP),
            Command::Quit => Response {
                lines: Vec::new(),
                quit: true,
            },
        }
    }

    async fn login(&mut self, username: &str, password: &str) -> Response {
        if self.state.auth.is_authenticated() {
            return Response::line("Already signed in, log out first");
        }
        match self.state.session.login(username, password).await {
            Ok(user) => Response::line(format!("Welcome, {}", user.display_name())),
            Err(message) => Response::line(format!("Login failed: {}", message)),
        }
    }

    fn whoami(&self) -> Response {
        match self.state.auth.current_user() {
            Some(user) => {
                let mut response = Response::line(format!("@{} ({})", user.username, user.display_name()));
                if !user.email.is_empty() {
                    response.push(format!("Email: {}", user.email));
                }
                if let Some(avatar) = user.avatar() {
                    response.push(format!("Image: {}", avatar));
                }
                response.push(format!("Favourites: {}", self.state.favourites.len()));
                response
            }
            None => Response::line("Not signed in"),
        }
    }

    async fn search(&mut self, query: Option<String>) -> Response {
        let query = query.unwrap_or_else(|| self.state.config.default_query.clone());
        match self.state.catalog.fetch_courses(&query).await {
            Ok(courses) => {
                self.courses = courses;
                self.filter = None;
                self.list()
            }
            Err(e) => Response::line(format!("Search failed: {}", e)),
        }
    }

    fn list(&self) -> Response {
        let visible = self.visible();
        let mut response = Response::line(format!("{} courses available", visible.len()));
        for (i, course) in visible.iter().enumerate() {
            let marker = if self.state.favourites.contains(&course.key) {
                "*"
            } else {
                " "
            };
            response.push(format!(
                "{:>3}.{} {} [{}] {:.1}★ ${}",
                i + 1,
                marker,
                course.title,
                course.category,
                course.rating,
                course.price
            ));
        }
        response
    }

    fn details(&self, course: &Course) -> Response {
        let favourite = if self.state.favourites.contains(&course.key) {
            "yes"
        } else {
            "no"
        };
        let mut response = Response::line(course.title.clone());
        response.push(format!("Instructor: {}", course.instructor));
        response.push(format!("Category:   {} ({})", course.category, course.level));
        response.push(format!("Duration:   {}", course.duration));
        response.push(format!(
            "Rating:     {:.1} from {} students",
            course.rating, course.students
        ));
        response.push(format!("Price:      ${}", course.price));
        response.push(format!("Updated:    {}", course.last_updated));
        response.push(format!("Favourite:  {}", favourite));
        response.push(course.description.clone());
        response
    }

    fn favourites(&self) -> Response {
        let favourites = self.state.favourites.list();
        let count = favourites.len();
        let noun = if count == 1 { "Course" } else { "Courses" };
        let mut response = Response::line(format!("{} {} Saved", count, noun));
        for course in favourites {
            response.push(format!("  {}  {}", course.key, course.title));
        }
        response
    }
}
