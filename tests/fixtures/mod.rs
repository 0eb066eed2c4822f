//! Fixtures shared by the HTTP and scraper tests

/// A posting using the most common markup: `<h1>` title, class-tagged
/// company and description.
pub const POSTING_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Careers at Acme</title></head>
  <body>
    <header><h1>Senior Engineer</h1></header>
    <div class="company-name">Acme</div>
    <section class="job-description">Build things</section>
  </body>
</html>"#;

/// A posting described only through schema.org microdata.
pub const MICRODATA_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Staff Data Engineer</title></head>
  <body itemscope itemtype="https://schema.org/JobPosting">
    <div itemprop="hiringOrganization" itemscope>
      <span itemprop="name">Globex</span>
    </div>
    <div itemprop="description">Design pipelines</div>
  </body>
</html>"#;

/// A page with none of the recognized markers.
pub const BARE_HTML: &str = "<html><body><p>Hello</p></body></html>";

/// Form fields for a valid application, minus the files.
#[derive(Debug, Clone)]
pub struct ApplicationFixture {
    pub job_title: &'static str,
    pub company_name: &'static str,
    pub job_description: &'static str,
    pub referrer_name: Option<&'static str>,
    pub recruiter_name: Option<&'static str>,
}

impl ApplicationFixture {
    pub fn fields(&self) -> Vec<(&'static str, &'static str)> {
        let mut fields = vec![
            ("job_title", self.job_title),
            ("company_name", self.company_name),
            ("job_description", self.job_description),
        ];
        if let Some(name) = self.referrer_name {
            fields.push(("referrer_name", name));
        }
        if let Some(name) = self.recruiter_name {
            fields.push(("recruiter_name", name));
        }
        fields
    }
}

pub const ACME: ApplicationFixture = ApplicationFixture {
    job_title: "Backend Engineer",
    company_name: "Acme Corp",
    job_description: "Design and run APIs",
    referrer_name: Some("Fox Mulder"),
    recruiter_name: None,
};

pub const GLOBEX: ApplicationFixture = ApplicationFixture {
    job_title: "Data Scientist",
    company_name: "Globex",
    job_description: "Model all the things",
    referrer_name: None,
    recruiter_name: Some("Hank Scorpio"),
};

pub const INITECH: ApplicationFixture = ApplicationFixture {
    job_title: "TPS Report Analyst",
    company_name: "Initech",
    job_description: "Cover sheets",
    referrer_name: None,
    recruiter_name: None,
};

pub const RESUME_BYTES: &[u8] = b"%PDF-1.4 fake resume";
