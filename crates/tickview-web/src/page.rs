//! The single dashboard page.
//!
//! The page owns no state beyond its session id and trigger counter. Every input
//! change asks `/api/render` for a fresh figure and applies it with `Plotly.react`.

pub const DEFAULT_TICKER: &str = "TSLA";

const PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Stock Price Viewer</title>
  <script src="__PLOTLY_SRC__"></script>
  <style>
    body { font-family: sans-serif; margin: 0 2rem; }
    h1 { text-align: center; margin-bottom: 30px; }
    .ticker-row { text-align: center; margin-bottom: 20px; }
    #ticker-input { font-size: 18px; margin-left: 10px; }
    #price-info { text-align: center; font-size: 20px; margin-top: 20px; }
  </style>
</head>
<body>
  <h1>Stock Price Viewer</h1>
  <div class="ticker-row">
    <label for="ticker-input">Enter Stock Ticker (e.g., TSLA, AAPL, NVDA):</label>
    <input id="ticker-input" type="text" value="__DEFAULT_TICKER__">
  </div>
  <div id="price-graph"></div>
  <div id="price-info"></div>
  <script>
    const session = "__SESSION_ID__";
    let issued = 0;
    let applied = 0;

    function apply(payload) {
      if (payload.superseded || !payload.result || payload.seq < applied) {
        return;
      }
      applied = payload.seq;
      const result = payload.result;
      Plotly.react("price-graph", result.chart.data, result.chart.layout);

      const status = result.outcome === "success" ? result.summary : result.status;
      const info = document.getElementById("price-info");
      info.textContent = status.text;
      info.style.color = status.color || "";
    }

    async function render(ticker) {
      const seq = ++issued;
      const query = new URLSearchParams({ ticker, session, seq: String(seq) });
      try {
        const response = await fetch("/api/render?" + query.toString());
        apply(await response.json());
      } catch (error) {
        if (seq >= applied) {
          const info = document.getElementById("price-info");
          info.textContent = "❌ Check ticker or connection";
          info.style.color = "red";
        }
      }
    }

    const input = document.getElementById("ticker-input");
    input.addEventListener("input", () => render(input.value));
    render(input.value);
  </script>
</body>
</html>
"#;

/// Renders the page for one browser session.
pub fn render(session_id: &str, default_ticker: &str) -> String {
    TEMPLATE
        .replace("__PLOTLY_SRC__", PLOTLY_SRC)
        .replace("__SESSION_ID__", &escape(session_id))
        .replace("__DEFAULT_TICKER__", &escape(default_ticker))
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
