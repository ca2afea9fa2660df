// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Course catalog
//
// There is no real course backend. Courses are generated from fixed
// templates after a short delay that stands in for network latency.

use crate::types::CourseLevel::{self, Advanced, Beginner, Intermediate};
use crate::types::{AppError, Course};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use uuid::Uuid;

const FALLBACK_THUMBNAIL: &str =
    "https://images.unsplash.com/photo-1516321318423-f06f85e504b3?w=400&h=300&fit=crop";

/// Anything that can answer a course search
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn fetch_courses(&self, query: &str) -> Result<Vec<Course>, AppError>;
}

struct CourseTemplate {
    title: &'static str,
    instructor: &'static str,
    category: &'static str,
    level: CourseLevel,
    duration: &'static str,
    image: Option<&'static str>,
}

const fn template(
    title: &'static str,
    instructor: &'static str,
    category: &'static str,
    level: CourseLevel,
    duration: &'static str,
    image: &'static str,
) -> CourseTemplate {
    CourseTemplate {
        title,
        instructor,
        category,
        level,
        duration,
        image: Some(image),
    }
}

const COMPUTER_SCIENCE: &[CourseTemplate] = &[
    template("Introduction to Computer Science", "Dr. John Smith", "Programming", Beginner, "8 weeks", "https://images.unsplash.com/photo-1461749280684-dccba630e2f6?w=400&h=300&fit=crop"),
    template("Data Structures and Algorithms", "Prof. Sarah Johnson", "Computer Science", Intermediate, "12 weeks", "https://images.unsplash.com/photo-1509228468518-180dd4864904?w=400&h=300&fit=crop"),
    template("Web Development Bootcamp", "Michael Chen", "Web Development", Beginner, "16 weeks", "https://images.unsplash.com/photo-1498050108023-c5249f4df085?w=400&h=300&fit=crop"),
    template("Machine Learning Fundamentals", "Dr. Emily Williams", "AI & ML", Advanced, "10 weeks", "https://images.unsplash.com/photo-1555949963-aa79dcee981c?w=400&h=300&fit=crop"),
    template("Mobile App Development", "David Martinez", "Mobile Development", Intermediate, "14 weeks", "https://images.unsplash.com/photo-1512941937669-90a1b58e7e9c?w=400&h=300&fit=crop"),
    template("Cloud Computing with AWS", "Jennifer Lee", "Cloud Computing", Intermediate, "8 weeks", "https://images.unsplash.com/photo-1451187580459-43490279c0fa?w=400&h=300&fit=crop"),
    template("Database Design and SQL", "Robert Brown", "Database", Beginner, "6 weeks", "https://images.unsplash.com/photo-1544383835-bda2bc66a55d?w=400&h=300&fit=crop"),
    template("Cybersecurity Essentials", "Dr. Amanda Taylor", "Security", Intermediate, "10 weeks", "https://images.unsplash.com/photo-1550751827-4bd374c3f58b?w=400&h=300&fit=crop"),
    template("Python Programming Masterclass", "Kevin Anderson", "Programming", Beginner, "12 weeks", "https://images.unsplash.com/photo-1526379095098-d400fd0bf935?w=400&h=300&fit=crop"),
    template("Full Stack JavaScript", "Lisa Thompson", "Web Development", Advanced, "20 weeks", "https://images.unsplash.com/photo-1579468118864-1b9ea3c0db4a?w=400&h=300&fit=crop"),
    template("React Native Development", "Chris Wilson", "Mobile Development", Intermediate, "10 weeks", "https://images.unsplash.com/photo-1551650975-87deedd944c3?w=400&h=300&fit=crop"),
    template("DevOps Engineering", "Dr. Mark Davis", "DevOps", Advanced, "12 weeks", "https://images.unsplash.com/photo-1618401471353-b98afee0b2eb?w=400&h=300&fit=crop"),
    template("UI/UX Design Principles", "Sophie Garcia", "Design", Beginner, "8 weeks", "https://images.unsplash.com/photo-1561070791-2526d30994b5?w=400&h=300&fit=crop"),
    template("Blockchain Development", "Alex Martinez", "Blockchain", Advanced, "14 weeks", "https://images.unsplash.com/photo-1639762681485-074b7f938ba0?w=400&h=300&fit=crop"),
    template("Game Development with Unity", "James Rodriguez", "Game Development", Intermediate, "16 weeks", "https://images.unsplash.com/photo-1511512578047-dfb367046420?w=400&h=300&fit=crop"),
    template("Artificial Intelligence Basics", "Dr. Maria Lopez", "AI & ML", Beginner, "10 weeks", "https://images.unsplash.com/photo-1677442136019-21780ecad995?w=400&h=300&fit=crop"),
    template("Software Testing and QA", "Patricia White", "Quality Assurance", Intermediate, "6 weeks", "https://images.unsplash.com/photo-1516116216624-53e697fedbea?w=400&h=300&fit=crop"),
    template("Network Security", "Daniel Harris", "Security", Advanced, "12 weeks", "https://images.unsplash.com/photo-1558494949-ef010cbdcc31?w=400&h=300&fit=crop"),
    template("Java Programming Complete", "Richard Clark", "Programming", Beginner, "14 weeks", "https://images.unsplash.com/photo-1517694712202-14dd9538aa97?w=400&h=300&fit=crop"),
    template("Docker and Kubernetes", "Susan Lewis", "DevOps", Advanced, "8 weeks", "https://images.unsplash.com/photo-1605745341112-85968b19335b?w=400&h=300&fit=crop"),
];

const GENERAL: &[CourseTemplate] = &[
    template("Introduction to Programming", "Dr. John Smith", "Programming", Beginner, "8 weeks", "https://images.unsplash.com/photo-1515879218367-8466d910aaa4?w=400&h=300&fit=crop"),
    template("Business Analytics", "Prof. Sarah Johnson", "Business", Intermediate, "10 weeks", "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=400&h=300&fit=crop"),
    template("Digital Marketing Strategy", "Michael Chen", "Marketing", Beginner, "6 weeks", "https://images.unsplash.com/photo-1432888622747-4eb9a8f2c293?w=400&h=300&fit=crop"),
    template("Project Management Professional", "Dr. Emily Williams", "Management", Intermediate, "12 weeks", "https://images.unsplash.com/photo-1454165804606-c3d57bc86b40?w=400&h=300&fit=crop"),
    template("Data Science Fundamentals", "David Martinez", "Data Science", Intermediate, "14 weeks", "https://images.unsplash.com/photo-1551288049-bebda4e38f71?w=400&h=300&fit=crop"),
];

/// Pick the templates a query maps to
fn select_templates(query: &str) -> Vec<&'static CourseTemplate> {
    let query = query.to_lowercase();

    if query.contains("business") || query.contains("management") {
        GENERAL
            .iter()
            .filter(|t| t.category.contains("Business") || t.category.contains("Management"))
            .collect()
    } else if query.contains("marketing") {
        GENERAL
            .iter()
            .filter(|t| t.category.contains("Marketing"))
            .collect()
    } else if query.contains("data") {
        COMPUTER_SCIENCE
            .iter()
            .filter(|t| t.category.contains("Data") || t.title.contains("Data"))
            .collect()
    } else {
        COMPUTER_SCIENCE.iter().collect()
    }
}

/// Generates randomized courses from templates after a fixed delay
pub struct MockCourseCatalog {
    delay: Duration,
    page_size: usize,
    default_query: String,
}

impl MockCourseCatalog {
    pub fn new(delay: Duration, page_size: usize, default_query: impl Into<String>) -> Self {
        Self {
            delay,
            page_size,
            default_query: default_query.into(),
        }
    }

    /// Build courses for a query without waiting
    pub fn generate(&self, query: &str) -> Vec<Course> {
        let query = if query.trim().is_empty() {
            self.default_query.as_str()
        } else {
            query
        };

        let mut rng = rand::thread_rng();

        select_templates(query)
            .into_iter()
            .take(self.page_size)
            .enumerate()
            .map(|(index, t)| Course {
                key: format!("course-{}-{}", index, Uuid::new_v4().simple()),
                title: t.title.to_string(),
                instructor: t.instructor.to_string(),
                category: t.category.to_string(),
                level: t.level,
                duration: t.duration.to_string(),
                rating: rng.gen_range(40..=50) as f32 / 10.0,
                students: rng.gen_range(1_000..51_000),
                price: rng.gen_range(29..199),
                thumbnail: t.image.unwrap_or(FALLBACK_THUMBNAIL).to_string(),
                description: format!(
                    "Learn {} from industry experts. This comprehensive course covers all essential topics and includes hands-on projects.",
                    t.title.to_lowercase()
                ),
                last_updated: "2024".to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl CourseCatalog for MockCourseCatalog {
    async fn fetch_courses(&self, query: &str) -> Result<Vec<Course>, AppError> {
        tokio::time::sleep(self.delay).await;
        let courses = self.generate(query);
        tracing::debug!("Generated {} courses for {:?}", courses.len(), query);
        Ok(courses)
    }
}
