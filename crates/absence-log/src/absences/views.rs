use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::export::{DOCUMENT_TITLE, TABLE_HEADER};
use super::report::AbsenceReport;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:60rem}\
table{border-collapse:collapse;width:100%}th,td{border:1px solid #999;padding:.4rem;text-align:left}\
.flash{padding:.5rem;margin-bottom:1rem}.flash.danger{background:#f8d7da}.flash.success{background:#d4edda}\
.pair{display:flex;gap:.5rem;margin-bottom:.5rem}";

const ADD_PAIR_SCRIPT: &str = "var p=document.querySelector('.pair').cloneNode(true);\
p.querySelectorAll('input').forEach(function(i){i.value=''});\
document.getElementById('pairs').appendChild(p)";

/// Severity of a one-off message shown above a page's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Danger,
}

impl FlashLevel {
    const fn class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }
}

fn page(title: &str, flash: Option<(FlashLevel, &str)>, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="uk" {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                @if let Some((level, message)) = flash {
                    div class={ "flash " (level.class()) } { (message) }
                }
                (body)
            }
        }
    }
}

/// Public submission form with repeatable person/reason pairs.
pub fn index_page() -> Markup {
    let body = html! {
        h1 { "Відсутні співробітники" }
        form method="post" action="/submit" {
            p { label { "Відділ " input name="name" required; } }
            div id="pairs" {
                div.pair {
                    input name="absent_person" placeholder="ПІБ" required;
                    input name="reason" placeholder="Причина" required;
                }
            }
            p { button type="button" onclick=(ADD_PAIR_SCRIPT) { "+" } }
            p { button type="submit" { "Надіслати" } }
        }
        p { a href="/login" { "Вхід для адміністратора" } }
    };
    page("Відсутні співробітники", None, body)
}

pub fn login_page(error: Option<&str>) -> Markup {
    let body = html! {
        h1 { "Вхід" }
        form method="post" action="/login" {
            p { label { "Логін " input name="username" required; } }
            p { label { "Пароль " input name="password" type="password" required; } }
            p { button type="submit" { "Увійти" } }
        }
    };
    page(
        "Вхід",
        error.map(|message| (FlashLevel::Danger, message)),
        body,
    )
}

/// Today's report as an HTML table plus the export and e-mail actions.
pub fn list_page(report: &AbsenceReport, flash: Option<(FlashLevel, &str)>) -> Markup {
    let body = html! {
        h1 { (DOCUMENT_TITLE) " за " (report.day.format("%Y-%m-%d")) }
        @if report.is_empty() {
            p { "Сьогодні відсутніх немає." }
        } @else {
            table {
                thead {
                    tr {
                        @for caption in TABLE_HEADER {
                            th { (caption) }
                        }
                    }
                }
                tbody {
                    @for row in &report.rows {
                        tr {
                            td { (row.index) }
                            td { strong { (row.department) } }
                            td { (row.details) }
                            td { (row.timestamp) }
                        }
                    }
                }
            }
        }
        p { a href="/download_doc" { "Завантажити .docx" } }
        form method="post" action="/send_email" {
            label { "E-mail " input name="email" type="email" required; }
            " "
            button type="submit" { "Надіслати звіт" }
        }
        p { a href="/logout" { "Вийти" } }
    };
    page(DOCUMENT_TITLE, flash, body)
}
