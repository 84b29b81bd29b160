//! Query descriptors and the catalogue of LeetCode GraphQL documents.
//!
//! The documents are sent verbatim; the client never inspects or rewrites
//! them. Each constructor fills in the variables, the operation name and the
//! user slug used for the `Referer` header.

use std::borrow::Cow;

use serde::Serialize;
use serde_json::{Value, json};

use crate::types::GraphQlRequest;

/// A GraphQL query ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    name: Cow<'static, str>,
    document: Cow<'static, str>,
    variables: Value,
    operation_name: Option<Cow<'static, str>>,
    referer_slug: Option<String>,
}

impl Query {
    /// Create a query from a name (used for logging and cache keys) and a document.
    pub fn new(name: impl Into<Cow<'static, str>>, document: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            document: document.into(),
            variables: Value::Object(Default::default()),
            operation_name: None,
            referer_slug: None,
        }
    }

    /// Set the variables object.
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    /// Set the operation name.
    pub fn with_operation_name(mut self, operation_name: impl Into<Cow<'static, str>>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }

    /// Set the user slug the request is made on behalf of.
    pub fn with_referer_slug(mut self, slug: impl Into<String>) -> Self {
        self.referer_slug = Some(slug.into());
        self
    }

    /// Query name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Query document.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Variables object.
    pub fn variables(&self) -> &Value {
        &self.variables
    }

    /// Operation name, if any.
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// User slug for the `Referer` header, if any.
    pub fn referer_slug(&self) -> Option<&str> {
        self.referer_slug.as_deref()
    }

    /// Borrow the query as a request body.
    pub fn request(&self) -> GraphQlRequest<'_> {
        GraphQlRequest {
            query: &self.document,
            variables: &self.variables,
            operation_name: self.operation_name(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalogue
    // ─────────────────────────────────────────────────────────────────────────

    /// Profile, contest and question counts in one batched request.
    pub fn user_complete_data(username: &str) -> Self {
        Self::new("user_complete_data", USER_COMPLETE_DATA)
            .with_variables(json!({ "username": username }))
            .with_operation_name("UserCompleteData")
            .with_referer_slug(username)
    }

    /// Profile, badges, recent submissions and submission stats.
    pub fn user_profile(username: &str) -> Self {
        Self::new("user_profile", USER_PROFILE)
            .with_variables(json!({ "username": username }))
            .with_operation_name("getUserProfile")
            .with_referer_slug(username)
    }

    /// Contest rating and history.
    pub fn contest_ranking(username: &str) -> Self {
        Self::new("contest_ranking", CONTEST_RANKING)
            .with_variables(json!({ "username": username }))
            .with_operation_name("getUserContestRanking")
            .with_referer_slug(username)
    }

    /// Solved-problem counts per topic tag.
    pub fn skill_stats(username: &str) -> Self {
        Self::new("skill_stats", SKILL_STATS)
            .with_variables(json!({ "username": username }))
            .with_operation_name("skillStats")
            .with_referer_slug(username)
    }

    /// Submission calendar for one year.
    pub fn profile_calendar(username: &str, year: i32) -> Self {
        Self::new("profile_calendar", PROFILE_CALENDAR)
            .with_variables(json!({ "username": username, "year": year }))
            .with_operation_name("userProfileCalendar")
            .with_referer_slug(username)
    }

    /// Accepted, failed and untouched question counts.
    pub fn question_progress(user_slug: &str) -> Self {
        Self::new("question_progress", QUESTION_PROGRESS)
            .with_variables(json!({ "userSlug": user_slug }))
            .with_operation_name("userProfileUserQuestionProgressV2")
            .with_referer_slug(user_slug)
    }

    /// Submission stats and beats percentages.
    pub fn submission_details(username: &str) -> Self {
        Self::new("submission_details", SUBMISSION_DETAILS)
            .with_variables(json!({ "username": username }))
            .with_operation_name("getSubmissionDetails")
            .with_referer_slug(username)
    }

    /// Per-difficulty totals and the user's progress against them.
    pub fn difficulty_stats(username: &str) -> Self {
        Self::new("difficulty_stats", DIFFICULTY_STATS)
            .with_variables(json!({ "username": username }))
            .with_operation_name("userSessionProgress")
            .with_referer_slug(username)
    }

    /// One page of the problem set.
    pub fn problems_list(category_slug: &str, limit: u32, filters: &ProblemFilters) -> Self {
        Self::new("problems_list", PROBLEMS_LIST)
            .with_variables(json!({
                "categorySlug": category_slug,
                "limit": limit,
                "skip": 0,
                "filters": filters,
            }))
            .with_operation_name("problemsetQuestionList")
    }
}

/// Filters for [`Query::problems_list`].
///
/// Unset fields are sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemFilters {
    /// `EASY`, `MEDIUM` or `HARD`.
    pub difficulty: Option<String>,
    /// `AC`, `TRIED` or `NOT_STARTED`.
    pub status: Option<String>,
    /// Topic tag slugs.
    pub tags: Option<Vec<String>>,
    /// Curated list identifier.
    pub list_id: Option<String>,
}

impl ProblemFilters {
    /// Stable text form, used in cache keys.
    pub fn cache_fragment(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Documents
// ─────────────────────────────────────────────────────────────────────────────

const USER_COMPLETE_DATA: &str = r#"
query UserCompleteData($username: String!) {
    matchedUser(username: $username) {
        username
        profile {
            realName
            userAvatar
            birthday
            ranking
            reputation
            websites
            countryName
            company
            school
            skillTags
            aboutMe
            starRating
        }
        submitStats: submitStatsGlobal {
            acSubmissionNum { difficulty count submissions }
            totalSubmissionNum { difficulty count submissions }
        }
        tagProblemCounts {
            advanced { tagName tagSlug problemsSolved }
            intermediate { tagName tagSlug problemsSolved }
            fundamental { tagName tagSlug problemsSolved }
        }
        contributions { points }
        badges { id displayName icon creationDate }
        upcomingBadges { name icon }
        activeBadge { id displayName icon creationDate }
        userCalendar {
            activeYears
            streak
            totalActiveDays
            dccBadges { timestamp badge { name icon } }
            submissionCalendar
        }
        problemsSolvedBeatsStats { difficulty percentage }
    }
    userContestRanking(username: $username) {
        attendedContestsCount
        rating
        globalRanking
        totalParticipants
        topPercentage
        badge { name }
    }
    userContestRankingHistory(username: $username) {
        attended
        rating
        ranking
        trendDirection
        problemsSolved
        totalProblems
        finishTimeInSeconds
        contest { title startTime }
    }
    allQuestionsCount { difficulty count }
}
"#;

const USER_PROFILE: &str = r#"
query getUserProfile($username: String!) {
    allQuestionsCount { difficulty count }
    matchedUser(username: $username) {
        contributions { points }
        profile {
            realName
            userAvatar
            birthday
            ranking
            reputation
            websites
            countryName
            company
            school
            skillTags
            aboutMe
            starRating
        }
        badges { id displayName icon creationDate }
        upcomingBadges { name icon }
        activeBadge { id displayName icon creationDate }
        submissionCalendar
        submitStats {
            acSubmissionNum { difficulty count submissions }
            totalSubmissionNum { difficulty count submissions }
        }
    }
    recentSubmissionList(username: $username) {
        title
        titleSlug
        timestamp
        statusDisplay
        lang
        memory
        runtime
        url
    }
    matchedUserStats: matchedUser(username: $username) {
        submitStats: submitStatsGlobal {
            acSubmissionNum { difficulty count submissions }
            totalSubmissionNum { difficulty count submissions }
        }
    }
}
"#;

const CONTEST_RANKING: &str = r#"
query getUserContestRanking($username: String!) {
    userContestRanking(username: $username) {
        attendedContestsCount
        rating
        globalRanking
        totalParticipants
        topPercentage
        badge { name }
    }
    userContestRankingHistory(username: $username) {
        attended
        rating
        ranking
        trendDirection
        problemsSolved
        totalProblems
        finishTimeInSeconds
        contest { title startTime }
    }
}
"#;

const SKILL_STATS: &str = r#"
query skillStats($username: String!) {
    matchedUser(username: $username) {
        tagProblemCounts {
            advanced { tagName tagSlug problemsSolved }
            intermediate { tagName tagSlug problemsSolved }
            fundamental { tagName tagSlug problemsSolved }
        }
    }
}
"#;

const PROFILE_CALENDAR: &str = r#"
query userProfileCalendar($username: String!, $year: Int!) {
    matchedUser(username: $username) {
        userCalendar(year: $year) {
            activeYears
            streak
            totalActiveDays
            dccBadges { timestamp badge { name icon } }
            submissionCalendar
        }
    }
}
"#;

const QUESTION_PROGRESS: &str = r#"
query userProfileUserQuestionProgressV2($userSlug: String!) {
    userProfileUserQuestionProgressV2(userSlug: $userSlug) {
        numAcceptedQuestions { count difficulty }
        numFailedQuestions { count difficulty }
        numUntouchedQuestions { count difficulty }
        userSessionBeatsPercentage { difficulty percentage }
    }
}
"#;

const SUBMISSION_DETAILS: &str = r#"
query getSubmissionDetails($username: String!) {
    matchedUser(username: $username) {
        submitStats {
            acSubmissionNum { difficulty count submissions }
            totalSubmissionNum { difficulty count submissions }
        }
        problemsSolvedBeatsStats { difficulty percentage }
    }
}
"#;

const DIFFICULTY_STATS: &str = r#"
query userSessionProgress($username: String!) {
    allQuestionsCount { difficulty count }
    matchedUser(username: $username) {
        submissionCalendar
        submitStats {
            acSubmissionNum { difficulty count submissions }
            totalSubmissionNum { difficulty count submissions }
        }
        problemsSolvedBeatsStats { difficulty percentage }
    }
}
"#;

const PROBLEMS_LIST: &str = r#"
query problemsetQuestionList($categorySlug: String, $limit: Int, $skip: Int, $filters: QuestionListFilterInput) {
    problemsetQuestionList: questionList(
        categorySlug: $categorySlug
        limit: $limit
        skip: $skip
        filters: $filters
    ) {
        total: totalNum
        questions: data {
            acRate
            difficulty
            freqBar
            questionFrontendId
            isFavor
            isPaidOnly
            status
            title
            titleSlug
            topicTags { name id slug }
            hasSolution
            hasVideoSolution
        }
    }
}
"#;
