//! Documentation page

use crate::AppState;
use axum::{response::Html, routing::get, Router};

pub fn docs_routes() -> Router<AppState> {
    Router::new().route("/", get(documentation))
}

async fn documentation() -> Html<&'static str> {
    Html(DOCS_HTML)
}

const DOCS_HTML: &str = r#"<!DOCTYPE html>
<html lang="de">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Bundestag Tagesordnung API</title>
    <meta name="description" content="Die Tagesordnung des Bundestages als iCal-Feed, JSON, XML und CSV.">
    <style>
        body { font-family: Arial, sans-serif; margin: 0; color: #333; background-color: #f4f4f4; }
        header { background-color: #0a4445; color: white; text-align: center; padding: 20px 0; }
        main { max-width: 800px; margin: 20px auto; padding: 20px; background-color: #fff; border-radius: 8px; }
        h2 { color: #0a4445; }
        code { background-color: #e8e8e8; padding: 2px 4px; border-radius: 4px; }
        table { border-collapse: collapse; }
        td, th { border: 1px solid #ccc; padding: 6px 10px; text-align: left; }
    </style>
</head>
<body>
<header>
    <h1>Bundestag Tagesordnung</h1>
    <p>Inoffizielle iCal-, JSON-, XML- und CSV-API.</p>
</header>
<main>
    <section>
        <h2>Kalenderfeed abonnieren</h2>
        <p>Die Tagesordnungen des laufenden Jahres lassen sich unter
        <code>/ical</code> als Kalenderfeed abonnieren. Die Daten der laufenden
        Sitzungswoche werden alle 15 Minuten aktualisiert.</p>
    </section>
    <section>
        <h2>Endpoints</h2>
        <table>
            <tr><th>Pfad</th><th>Format</th></tr>
            <tr><td><code>/ical</code> (Alias <code>/ics</code>)</td><td>iCalendar-Feed</td></tr>
            <tr><td><code>/json</code></td><td>JSON-Array</td></tr>
            <tr><td><code>/xml</code></td><td>XML-Dokument</td></tr>
            <tr><td><code>/csv</code></td><td>CSV-Tabelle</td></tr>
            <tr><td><code>/data-list</code></td><td>Vorhandene Jahre und Kalenderwochen</td></tr>
        </table>
    </section>
    <section>
        <h2>Parameter</h2>
        <ul>
            <li><code>year</code>: Jahr (Standard: laufendes Jahr)</li>
            <li><code>week</code>: Kalenderwoche, mit <code>year</code> kombinierbar</li>
            <li><code>month</code>: Monat</li>
            <li><code>day</code>: Tag, zusammen mit <code>month</code></li>
            <li><code>status</code>: Filter auf den Status-Text</li>
            <li><code>na</code>, <code>naAlarm</code>, <code>showSW</code> (nur iCal):
                Termine für namentliche Abstimmungen, Erinnerungen dazu und
                Sitzungswochen-Markierungen</li>
        </ul>
        <p>Beispiel: <code>/ical?year=2024&amp;week=3&amp;na=true</code></p>
    </section>
</main>
</body>
</html>
"#;
