use crate::state::Session;

pub fn render_index(session: &Session, model: &str) -> String {
    let summary = session
        .plan
        .as_ref()
        .map(|plan| plan.summary.as_str())
        .filter(|summary| !summary.is_empty())
        .unwrap_or("No plan yet. Save the survey, then generate one.");
    let habits = session
        .plan
        .as_ref()
        .map_or(0, |plan| plan.new_habits.len());

    INDEX_HTML
        .replace("{{MODEL}}", &escape_html(model))
        .replace("{{SUMMARY}}", &escape_html(summary))
        .replace("{{HABITS}}", &habits.to_string())
        .replace("{{REMINDERS}}", &session.reminders.len().to_string())
        .replace("{{CHECKINS}}", &session.checkins.len().to_string())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>CareFit</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef4ec;
      --bg-2: #bfe0c9;
      --ink: #23302a;
      --accent: #2f9e6b;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3f1e6 60%, #f4f8f2 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.2rem;
    }

    .subtitle,
    .hint {
      margin: 0;
      color: #5f5c57;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat,
    section.card {
      background: white;
      border-radius: 20px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .stat .label {
      display: block;
      font-size: 0.85rem;
      color: #7a746d;
    }

    .stat .value {
      font-size: 1.8rem;
      font-weight: 600;
    }

    form {
      display: grid;
      gap: 10px;
    }

    input,
    select,
    textarea {
      font: inherit;
      padding: 8px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button {
      font: inherit;
      font-weight: 600;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }

    button.secondary {
      background: var(--accent-2);
    }

    .chart-bar {
      fill: var(--accent);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    pre {
      white-space: pre-wrap;
      background: #f6f7f5;
      padding: 12px;
      border-radius: 12px;
      max-height: 320px;
      overflow: auto;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>CareFit</h1>
      <p class="subtitle">Survey, plan, reminders, check-ins, then adjust. Model: {{MODEL}}</p>
    </header>

    <section class="panel">
      <div class="stat"><span class="label">Habits</span><span class="value" id="habits">{{HABITS}}</span></div>
      <div class="stat"><span class="label">Reminders</span><span class="value" id="reminders">{{REMINDERS}}</span></div>
      <div class="stat"><span class="label">Check-ins</span><span class="value" id="checkins">{{CHECKINS}}</span></div>
    </section>

    <section class="card">
      <h2>1. Survey</h2>
      <form id="survey-form">
        <select name="domain">
          <option>Sleep</option>
          <option>Eating (late-night snacking / bingeing)</option>
          <option>Exercise</option>
          <option>Focus / study</option>
          <option>Stress / mood</option>
          <option>Digital habits (phone / scrolling)</option>
        </select>
        <input name="habit_to_improve" placeholder="Habit to improve, e.g. falling asleep at 3am" required />
        <select name="difficulty_pref">
          <option>light (easy)</option>
          <option>moderate (mid)</option>
          <option>intense (challenge)</option>
        </select>
        <label>Stress (1-10) <input name="stress_level" type="number" min="1" max="10" value="5" /></label>
        <label>Energy (1-10) <input name="energy_level" type="number" min="1" max="10" value="6" /></label>
        <label>Commitment (1-10) <input name="commitment" type="number" min="1" max="10" value="7" /></label>
        <textarea name="notes" placeholder="Extra constraints (optional)"></textarea>
        <button type="submit">Save survey</button>
      </form>
    </section>

    <section class="card">
      <h2>2. Plan</h2>
      <p id="plan-summary">{{SUMMARY}}</p>
      <input id="api-key" type="password" placeholder="OpenAI API key (optional when set on the server)" />
      <p>
        <button id="generate-btn" type="button">Generate plan</button>
        <button id="adjust-btn" class="secondary" type="button">Adjust from check-ins</button>
      </p>
      <pre id="plan-json"></pre>
    </section>

    <section class="card">
      <h2>3. Check-in</h2>
      <form id="checkin-form">
        <div id="checkin-items"></div>
        <label>Mood (1-10) <input name="mood" type="number" min="1" max="10" value="6" /></label>
        <button type="submit">Save today's check-in</button>
      </form>
      <svg id="chart" viewBox="0 0 600 220" role="img" aria-label="Completion over the last 7 days"></svg>
      <pre id="summary-json"></pre>
    </section>

    <div class="status" id="status"></div>
    <p class="hint">Everything lives in this server process and is cleared on restart or reset.</p>
    <button id="reset-btn" class="secondary" type="button">Reset session</button>
  </main>
  <script>
    const statusEl = document.getElementById('status');
    const chartEl = document.getElementById('chart');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const api = async (path, options = {}) => {
      const response = await fetch(path, {
        headers: { 'Content-Type': 'application/json' },
        ...options,
      });
      if (!response.ok) {
        throw new Error(await response.text());
      }
      return response.json();
    };

    const renderChart = (points) => {
      const barWidth = 600 / points.length;
      chartEl.innerHTML = points.map((point, idx) => {
        const height = Math.max(0, Math.min(100, point.rate)) * 1.8;
        const x = idx * barWidth + 12;
        return `<rect class="chart-bar" x="${x}" y="${190 - height}" width="${barWidth - 24}" height="${height}" rx="6"></rect>` +
          `<text class="chart-label" x="${x + (barWidth - 24) / 2}" y="210" text-anchor="middle">${point.date} · ${point.rate}%</text>`;
      }).join('');
    };

    const renderCheckinItems = (plan) => {
      const container = document.getElementById('checkin-items');
      const habits = (plan && plan.new_habits) || [];
      container.replaceChildren();
      habits.forEach((habit, idx) => {
        const label = document.createElement('label');
        const box = document.createElement('input');
        box.type = 'checkbox';
        box.id = `ck-${idx}`;
        box.dataset.name = habit.name;
        label.append(box, document.createTextNode(' ' + habit.name));
        container.append(label, document.createElement('br'));
      });
    };

    const refresh = async () => {
      const session = await api('/api/session');
      document.getElementById('habits').textContent = session.plan ? session.plan.new_habits.length : 0;
      document.getElementById('reminders').textContent = session.reminders.length;
      document.getElementById('checkins').textContent = session.checkins.length;
      document.getElementById('plan-json').textContent = session.plan ? JSON.stringify(session.plan, null, 2) : '';
      if (session.last_error) {
        setStatus('Last generation error: ' + session.last_error, 'error');
      }
      renderCheckinItems(session.plan);
      renderChart(await api('/api/checkins/chart'));
      document.getElementById('summary-json').textContent =
        JSON.stringify(await api('/api/checkins/summary'), null, 2);
    };

    document.getElementById('survey-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const data = Object.fromEntries(new FormData(event.target).entries());
      ['stress_level', 'energy_level', 'commitment'].forEach((key) => { data[key] = Number(data[key]); });
      try {
        await api('/api/profile', { method: 'POST', body: JSON.stringify(data) });
        setStatus('Survey saved. Generate a plan next.', 'ok');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    const runPlan = async (path, label) => {
      const key = document.getElementById('api-key').value.trim();
      setStatus(label + '...', '');
      try {
        const result = await api(path, { method: 'POST', body: JSON.stringify(key ? { api_key: key } : {}) });
        if (result.plan) {
          document.getElementById('plan-summary').textContent = result.plan.summary || '-';
          setStatus('Plan ready.', 'ok');
        } else {
          setStatus('Could not generate a plan: ' + result.error, 'error');
        }
        await refresh();
      } catch (err) {
        setStatus(err.message, 'error');
      }
    };

    document.getElementById('generate-btn').addEventListener('click', () => runPlan('/api/plan/generate', 'Generating'));
    document.getElementById('adjust-btn').addEventListener('click', () => runPlan('/api/plan/adjust', 'Adjusting'));

    document.getElementById('checkin-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const items = Array.from(document.querySelectorAll('#checkin-items input')).map((input) => ({
        name: input.dataset.name,
        done: input.checked,
      }));
      const mood = Number(new FormData(event.target).get('mood'));
      try {
        const result = await api('/api/checkins', { method: 'POST', body: JSON.stringify({ mood, items }) });
        const c = result.completion;
        setStatus(`Saved: ${c.done}/${c.total} (${c.rate.toFixed(1)}%)`, 'ok');
        await refresh();
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('reset-btn').addEventListener('click', async () => {
      await api('/api/session/reset', { method: 'POST' });
      document.getElementById('plan-summary').textContent = 'No plan yet.';
      setStatus('Session cleared.', 'ok');
      await refresh();
    });

    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
