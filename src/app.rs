use leptos::prelude::*;

use crate::aggregate::{CategoricalField, FeedbackSummary};
use crate::model::FeedbackEntry;

const RATING_OPTIONS: &[&str] = &["Excellent", "Good", "Average", "Poor"];
const VOLUNTEER_OPTIONS: &[&str] = &["Yes", "No", "Maybe"];

// Form field names are the ones the submit route reads.
const RATING_QUESTIONS: &[(&str, &str)] = &[
    ("overall_experience", "How was your overall experience?"),
    ("program_content", "How would you rate the program content?"),
    ("food", "How was the food?"),
    ("management", "How well was the event managed?"),
    ("venue", "How would you rate the venue?"),
];

pub fn render_feedback_form() -> String {
    render_page(|| {
        view! {
            <Shell title="Event Feedback">
                <FeedbackFormPage />
            </Shell>
        }
    })
}

pub fn render_thank_you() -> String {
    render_page(|| {
        view! {
            <Shell title="Thank You">
                <ThankYouPage />
            </Shell>
        }
    })
}

pub fn render_admin_login(error: Option<String>) -> String {
    render_page(move || {
        view! {
            <Shell title="Admin Login">
                <AdminLoginPage error=error />
            </Shell>
        }
    })
}

pub fn render_dashboard(rows: Vec<FeedbackEntry>, summary: FeedbackSummary) -> String {
    render_page(move || {
        view! {
            <Shell title="Feedback Dashboard">
                <DashboardPage rows=rows summary=summary />
            </Shell>
        }
    })
}

// Views are built and rendered inside a throwaway reactive owner.
fn render_page<F, V>(build: F) -> String
where
    F: FnOnce() -> V,
    V: RenderHtml,
{
    let owner = Owner::new();
    owner.with(|| build().to_html())
}

#[component]
fn Shell(title: &'static str, children: Children) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <title>{title}</title>
            </head>
            <body>
                <main>{children()}</main>
            </body>
        </html>
    }
}

#[component]
fn ChoiceQuestion(
    name: &'static str,
    prompt: &'static str,
    options: &'static [&'static str],
) -> impl IntoView {
    view! {
        <fieldset>
            <legend>{prompt}</legend>
            {options
                .iter()
                .map(|&option| {
                    view! {
                        <label>
                            <input type="radio" name=name value=option />
                            {option}
                        </label>
                    }
                })
                .collect_view()}
        </fieldset>
    }
}

#[component]
fn FeedbackFormPage() -> impl IntoView {
    view! {
        <h1>"Event Feedback"</h1>
        <p>"Tell us how the event went. Every question is optional."</p>
        <form method="post" action="/submit">
            {RATING_QUESTIONS
                .iter()
                .map(|&(name, prompt)| {
                    view! { <ChoiceQuestion name=name prompt=prompt options=RATING_OPTIONS /> }
                })
                .collect_view()}
            <label>
                "What was your favorite part?"
                <input type="text" name="favorite_part" />
            </label>
            <label>
                "Any suggestions for next time?"
                <textarea name="suggestions"></textarea>
            </label>
            <ChoiceQuestion
                name="volunteer"
                prompt="Would you like to help out at a future event?"
                options=VOLUNTEER_OPTIONS
            />
            <label>
                "Anything else?"
                <textarea name="comments"></textarea>
            </label>
            <button type="submit">"Submit Feedback"</button>
        </form>
    }
}

#[component]
fn ThankYouPage() -> impl IntoView {
    view! {
        <h1>"Thank you!"</h1>
        <p>"Your feedback has been recorded."</p>
        <p>
            <a href="/">"Submit another response"</a>
        </p>
    }
}

#[component]
fn AdminLoginPage(error: Option<String>) -> impl IntoView {
    view! {
        <h1>"Admin Login"</h1>
        <form method="post" action="/admin">
            <label>
                "Password: "
                <input type="password" name="password" />
            </label>
            <button type="submit">"Login"</button>
        </form>
        {error.map(|e| view! { <p class="error">{e}</p> })}
    }
}

#[component]
fn DashboardPage(rows: Vec<FeedbackEntry>, summary: FeedbackSummary) -> impl IntoView {
    let total = format!("Total responses: {}", summary.total_count);
    let no_rows = rows.is_empty();

    let tallies = CategoricalField::ALL
        .iter()
        .map(|&field| {
            let buckets = summary.ranked(field);
            view! {
                <section class="tally">
                    <h3>{field.label()}</h3>
                    <table>
                        <tbody>
                            {buckets
                                .into_iter()
                                .map(|(value, count)| {
                                    view! {
                                        <tr>
                                            <td>{display_value(value)}</td>
                                            <td>{count}</td>
                                        </tr>
                                    }
                                })
                                .collect_view()}
                        </tbody>
                    </table>
                </section>
            }
        })
        .collect_view();

    let table_rows = rows
        .into_iter()
        .map(|row| {
            view! {
                <tr>
                    <td>{row.id}</td>
                    <td>{row.overall}</td>
                    <td>{row.program}</td>
                    <td>{row.food}</td>
                    <td>{row.management}</td>
                    <td>{row.venue}</td>
                    <td>{row.favorite}</td>
                    <td>{row.suggestions}</td>
                    <td>{row.contribute}</td>
                    <td>{row.comments}</td>
                    <td>{row.timestamp}</td>
                </tr>
            }
        })
        .collect_view();

    view! {
        <h1>"Feedback Dashboard"</h1>
        <p>
            <a href="/logout">"Logout"</a>
        </p>
        <p class="total">{total}</p>
        <h2>"Responses by question"</h2>
        {tallies}
        <h2>"All responses"</h2>
        {no_rows.then(|| view! { <p>"No feedback yet."</p> })}
        <table class="responses">
            <thead>
                <tr>
                    <th>"ID"</th>
                    <th>"Overall"</th>
                    <th>"Program"</th>
                    <th>"Food"</th>
                    <th>"Management"</th>
                    <th>"Venue"</th>
                    <th>"Favorite"</th>
                    <th>"Suggestions"</th>
                    <th>"Volunteer"</th>
                    <th>"Comments"</th>
                    <th>"Submitted"</th>
                </tr>
            </thead>
            <tbody>{table_rows}</tbody>
        </table>
    }
}

// The empty answer is a real bucket; give it something visible.
fn display_value(value: String) -> AnyView {
    if value.is_empty() {
        view! { <em>"(blank)"</em> }.into_any()
    } else {
        value.into_any()
    }
}
