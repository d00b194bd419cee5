use crate::config::Config;

pub fn render_index(config: &Config) -> String {
    INDEX_HTML
        .replace("{{WINDOW_START}}", &config.window_start.to_string())
        .replace("{{WINDOW_END}}", &config.window_end.to_string())
        .replace("{{WORK_MINUTES}}", &config.timer.work_minutes.to_string())
        .replace("{{BREAK_MINUTES}}", &config.timer.break_minutes.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Solo Tracker</title>
  <style>
    :root {
      --bg: #0d0f1a;
      --card: #161a2b;
      --ink: #f0f0f0;
      --muted: #b0b0b0;
      --accent: #4d79ff;
      --strength: #ff4d4d;
      --intelligence: #4d79ff;
      --charisma: #9966ff;
      --wisdom: #66ff99;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Roboto Mono", monospace;
      padding: 24px;
    }

    main {
      max-width: 960px;
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    section {
      background: var(--card);
      border-radius: 16px;
      padding: 20px;
    }

    h1, h2 {
      margin: 0 0 12px;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 12px;
    }

    .bar {
      height: 8px;
      background: rgba(255, 255, 255, 0.1);
      border-radius: 4px;
      overflow: hidden;
    }

    .bar span {
      display: block;
      height: 100%;
      background: var(--accent);
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    td, th {
      padding: 6px;
      text-align: right;
      border-bottom: 1px solid rgba(255, 255, 255, 0.08);
    }

    .muted {
      color: var(--muted);
    }

    .hidden {
      display: none;
    }

    #timer-display {
      font-size: 3rem;
    }
  </style>
</head>
<body>
  <main>
    <section id="auth">
      <h1>Solo Tracker</h1>
      <input id="email" type="email" placeholder="email" />
      <input id="password" type="password" placeholder="password" />
      <button id="signin">Sign in</button>
      <button id="signup">Sign up</button>
      <span id="who" class="muted"></span>
      <button id="signout" class="hidden">Sign out</button>
    </section>

    <section>
      <h2>Stats</h2>
      <div id="stats" class="stats"></div>
    </section>

    <section>
      <h2>Tasks</h2>
      <form id="task-form">
        <input id="task-name" placeholder="task" />
        <select id="task-category">
          <option value="strength">Strength</option>
          <option value="intelligence">Intelligence</option>
          <option value="charisma">Charisma</option>
          <option value="wisdom">Wisdom</option>
        </select>
        <input id="task-xp" type="number" min="1" value="10" />
        <button type="submit">Add</button>
      </form>
      <ul id="tasks"></ul>
    </section>

    <section>
      <h2>Daily XP</h2>
      <p class="muted">{{WINDOW_START}} to {{WINDOW_END}}</p>
      <button id="prev-week">Prev</button>
      <span id="week-range"></span>
      <button id="next-week">Next</button>
      <table>
        <thead>
          <tr><th>#</th><th>Date</th><th>STR</th><th>INT</th><th>CHA</th><th>WIS</th><th>Total</th></tr>
        </thead>
        <tbody id="xp-table-body"></tbody>
      </table>
      <svg id="chart" viewBox="0 0 600 220" role="img" aria-label="Daily XP chart"></svg>
    </section>

    <section>
      <h2>Focus timer</h2>
      <div id="timer-display">00:00</div>
      <div class="bar"><span id="progress-fill" style="width: 0%"></span></div>
      <p id="timer-phase" class="muted"></p>
      <button id="start-btn">Start</button>
      <button id="pause-btn">Pause</button>
      <button id="reset-btn">Reset</button>
      <label>Work <input id="pomodoro-time" type="number" min="1" value="{{WORK_MINUTES}}" /></label>
      <label>Break <input id="break-time" type="number" min="1" value="{{BREAK_MINUTES}}" /></label>
    </section>
  </main>

  <script>
    const COLORS = { strength: '#ff4d4d', intelligence: '#4d79ff', charisma: '#9966ff', wisdom: '#66ff99' };
    let token = localStorage.getItem('token');
    let page = 0;

    function escapeHtml(value) {
      return String(value).replace(/[&<>"']/g, ch => ({
        '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;',
      })[ch]);
    }

    async function api(method, path, body) {
      const headers = { 'Content-Type': 'application/json' };
      if (token) headers.Authorization = `Bearer ${token}`;
      const res = await fetch(path, { method, headers, body: body ? JSON.stringify(body) : undefined });
      if (!res.ok) throw new Error(await res.text());
      return res.status === 204 ? null : res.json();
    }

    async function authenticate(kind) {
      try {
        const session = await api('POST', `/api/auth/${kind}`, {
          email: document.getElementById('email').value,
          password: document.getElementById('password').value,
        });
        token = session.token;
        localStorage.setItem('token', token);
        document.getElementById('who').textContent = session.email;
        refresh();
      } catch (err) {
        alert(`${kind === 'signin' ? 'Login' : 'Signup'} error: ${err.message}`);
      }
    }

    function renderStats(stats) {
      document.getElementById('stats').innerHTML = Object.entries(stats).map(([name, stat]) => `
        <div>
          <strong>${name}</strong> Lv ${stat.level} (${stat.xp} XP)
          <div class="bar"><span style="width:${Math.min(stat.xp, 100)}%;background:${COLORS[name]}"></span></div>
        </div>`).join('');
    }

    function renderTasks(tasks) {
      document.getElementById('tasks').innerHTML = tasks.map(task => {
        const id = escapeHtml(task.id);
        return `
        <li>
          ${escapeHtml(task.name)} <span class="muted">${escapeHtml(task.category)} | ${task.xp} XP</span>
          ${task.completed ? '<span>Completed</span>' : `<button onclick="completeTask('${id}')">Complete</button>`}
          <button onclick="deleteTask('${id}')">Delete</button>
        </li>`;
      }).join('');
    }

    function renderProgress(progress) {
      document.getElementById('prev-week').disabled = !progress.has_prev;
      document.getElementById('next-week').disabled = !progress.has_next;
      document.getElementById('week-range').textContent =
        `Days ${progress.first_day}-${progress.last_day} of ${progress.total_days}`;
      document.getElementById('xp-table-body').innerHTML = progress.rows.map(row => `
        <tr><td>${row.day}</td><td>${row.date}</td><td>${row.strength}</td><td>${row.intelligence}</td>
        <td>${row.charisma}</td><td>${row.wisdom}</td><td><strong>${row.total}</strong></td></tr>`).join('');
      page = progress.page;
    }

    function renderChart(chart) {
      const el = document.getElementById('chart');
      const width = 600, height = 220, pad = 30;
      const count = chart.labels.length;
      if (count === 0) {
        el.innerHTML = '';
        return;
      }
      const max = Math.max(100, ...Object.values(chart.series).flat());
      const x = i => pad + (count === 1 ? 0 : i * (width - 2 * pad) / (count - 1));
      const y = v => height - pad - v * (height - 2 * pad) / max;
      el.innerHTML = Object.entries(chart.series).map(([name, points]) =>
        `<polyline fill="none" stroke="${COLORS[name]}" stroke-width="2"
          points="${points.map((v, i) => `${x(i)},${y(v)}`).join(' ')}" />`).join('');
    }

    function renderTimer(view) {
      document.getElementById('timer-display').textContent = view.display;
      document.getElementById('progress-fill').style.width = `${view.progress_percent}%`;
      document.getElementById('timer-phase').textContent =
        (view.is_break ? 'Break' : 'Work') + (view.last_notice ? ` | ${view.last_notice}` : '');
    }

    async function refresh() {
      if (!token) return;
      try {
        renderStats(await api('GET', '/api/stats'));
        renderTasks(await api('GET', '/api/tasks'));
        renderProgress(await api('GET', `/api/progress?page=${page}`));
        renderChart(await api('GET', '/api/progress/chart'));
        renderTimer(await api('GET', '/api/timer'));
      } catch (err) {
        console.error('refresh failed:', err);
      }
    }

    window.completeTask = id => api('POST', `/api/tasks/${id}/complete`).then(refresh).catch(console.error);
    window.deleteTask = id => api('DELETE', `/api/tasks/${id}`).then(refresh).catch(console.error);

    document.getElementById('signin').onclick = () => authenticate('signin');
    document.getElementById('signup').onclick = () => authenticate('signup');
    document.getElementById('signout').onclick = async () => {
      await api('POST', '/api/auth/signout').catch(console.error);
      token = null;
      localStorage.removeItem('token');
    };

    document.getElementById('task-form').onsubmit = async event => {
      event.preventDefault();
      const name = document.getElementById('task-name').value;
      const category = document.getElementById('task-category').value;
      const xp = parseInt(document.getElementById('task-xp').value, 10);
      if (!name || !category || !xp) return;
      await api('POST', '/api/tasks', { name, category, xp }).catch(console.error);
      event.target.reset();
      refresh();
    };

    document.getElementById('prev-week').onclick = () => { page -= 1; refresh(); };
    document.getElementById('next-week').onclick = () => { page += 1; refresh(); };

    for (const action of ['start', 'pause', 'reset']) {
      document.getElementById(`${action}-btn`).onclick = () =>
        api('POST', `/api/timer/${action}`).then(renderTimer).catch(console.error);
    }
    document.getElementById('pomodoro-time').onchange = event =>
      api('POST', '/api/timer/settings', { work_minutes: parseInt(event.target.value, 10) }).then(renderTimer);
    document.getElementById('break-time').onchange = event =>
      api('POST', '/api/timer/settings', { break_minutes: parseInt(event.target.value, 10) }).then(renderTimer);

    setInterval(() => {
      if (token) api('GET', '/api/timer').then(renderTimer).catch(() => {});
    }, 1000);

    document.getElementById('signout').classList.toggle('hidden', !token);
    refresh();
  </script>
</body>
</html>
"#;
